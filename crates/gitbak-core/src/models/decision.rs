/// Visibility of a repository created on the hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Public,
    Internal,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Private, Visibility::Public, Visibility::Internal];
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Public => write!(f, "public"),
            Visibility::Internal => write!(f, "internal"),
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "public" => Ok(Visibility::Public),
            "internal" => Ok(Visibility::Internal),
            _ => Err(format!("unknown visibility: {s}")),
        }
    }
}

/// Outcome of the interactive remote-creation prompt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDecision {
    pub use_ssh_remotes: bool,
    pub use_hosted_remote: bool,
    /// Set iff `use_hosted_remote`.
    pub visibility: Option<Visibility>,
}

impl PromptDecision {
    /// Nothing selected: creation is a no-op.
    pub fn none() -> Self {
        Self {
            use_ssh_remotes: false,
            use_hosted_remote: false,
            visibility: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse_case_insensitive() {
        assert_eq!("PUBLIC".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!(" internal ".parse::<Visibility>().unwrap(), Visibility::Internal);
        assert!("secret".parse::<Visibility>().is_err());
        assert!("".parse::<Visibility>().is_err());
    }
}
