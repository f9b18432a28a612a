use core::{
    any::{type_name, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

/// Identity of an abstract service capability.
///
/// Two tokens are equal if and only if they were built from the same service
/// type; the captured type name is carried only for diagnostics. An abstract
/// capability is usually expressed as a boxed trait object service type:
///
/// ```rust
/// use wirebox::Token;
///
/// trait UserRepo {}
///
/// let token = Token::of::<Box<dyn UserRepo + Send + Sync>>();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Token {
    id: TypeId,
    name: &'static str,
}

impl Token {
    #[inline]
    #[must_use]
    pub fn of<S>() -> Self
    where
        S: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub(crate) fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Token {}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::Token;

    trait Service {}
    trait OtherService {}

    #[test]
    fn test_identity_equality() {
        assert_eq!(Token::of::<i32>(), Token::of::<i32>());
        assert_ne!(Token::of::<i32>(), Token::of::<i64>());
        assert_eq!(
            Token::of::<Box<dyn Service + Send + Sync>>(),
            Token::of::<Box<dyn Service + Send + Sync>>(),
        );
        assert_ne!(
            Token::of::<Box<dyn Service + Send + Sync>>(),
            Token::of::<Box<dyn OtherService + Send + Sync>>(),
        );
    }

    #[test]
    fn test_short_name() {
        struct Local;

        assert_eq!(Token::of::<Local>().short_name(), "Local");
        assert!(Token::of::<Local>().name().contains("test_short_name"));
    }
}
