use std::fmt::Display;
use std::hash::Hash;

/// Contract every map key must satisfy.
///
/// A key must be usable as a hash map key (`Hash + Eq`) and must render
/// itself to a stable string through `Display`. The default partition
/// function hashes that rendering, so two equal keys must always render to
/// the same string.
///
/// The trait is implemented for every type that meets the bounds, so
/// `String`, `&str`, the integer types and any user type deriving `Hash`,
/// `Eq` and implementing `Display` work out of the box.
pub trait ShardKey: Hash + Eq + Display {}

impl<T> ShardKey for T where T: Hash + Eq + Display + ?Sized {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Hash, PartialEq, Eq)]
    struct UserId(u32);

    impl fmt::Display for UserId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "user:{}", self.0)
        }
    }

    fn assert_key<K: ShardKey + ?Sized>(_: &K) {}

    #[test]
    fn test_std_and_user_types_are_keys() {
        assert_key("str");
        assert_key(&String::from("owned"));
        assert_key(&42_i32);
        assert_key(&7_u64);
        assert_key(&UserId(1));
    }
}
