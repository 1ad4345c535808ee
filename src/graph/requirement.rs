/// A dependency as declared by a distribution: a name and an optional
/// version specifier, exactly as written between the parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredRequirement {
    pub name: String,
    pub version: Option<String>,
}

impl DeclaredRequirement {
    /// Parse a `Requires-Dist` style string.
    ///
    /// Everything from the first `;` on (environment markers, extras) is
    /// dropped without being evaluated. The rest is read as `<name>` optionally
    /// followed by `(<version-spec>)`. No PEP 440 validation takes place:
    /// `foo>=1.0` yields the name `foo>=1.0` with no version.
    ///
    /// Returns `None` when no name is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let concrete = raw.split(';').next().unwrap_or_default();

        let (name, version) = match concrete.split_once('(') {
            Some((name, rest)) => {
                let spec = rest.split(')').next().unwrap_or_default().trim();
                (name, (!spec.is_empty()).then(|| spec.to_string()))
            }
            None => (concrete, None),
        };

        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            version,
        })
    }
}
