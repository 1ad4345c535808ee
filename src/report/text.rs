use std::fmt::{self, Write};

use super::Report;

const DEPENDENCIES_BEGIN: &str = "# ========= BEGIN Dependencies of required packages ========= #";
const DEPENDENCIES_END: &str = "# =========  END  Dependencies of required packages ========= #";
const REQUIRED_BEGIN: &str = "# ========= BEGIN         Required packages         ========= #";
const REQUIRED_END: &str = "# =========  END          Required packages         ========= #";

pub(super) fn render(report: &Report) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_manifest(&mut out, report)?;
    Ok(out)
}

fn write_manifest(out: &mut impl Write, report: &Report) -> fmt::Result {
    writeln!(out, "{}", DEPENDENCIES_BEGIN)?;
    for group in &report.provenance {
        writeln!(out, "# Requirement for {}", group.distribution)?;
        for requirement in &group.requirements {
            writeln!(out, "# \t{}", requirement)?;
        }
    }
    for dependency in &report.dependencies {
        writeln!(out, "{}", dependency)?;
    }
    writeln!(out, "{}", DEPENDENCIES_END)?;

    writeln!(out, "{}", REQUIRED_BEGIN)?;
    for required in &report.required {
        writeln!(out, "{}", required)?;
    }
    writeln!(out, "{}", REQUIRED_END)?;

    for module in &report.unknown {
        writeln!(out, "# Doesn't know package {}.", module)?;
    }
    Ok(())
}
