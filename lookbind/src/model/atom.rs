use std::{fmt, ops::Deref};
use string_cache::DefaultAtom;

/// Atom (interned string used for names, type names and tokens)
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Atom(DefaultAtom);

impl Atom {
    pub fn new(s: &str) -> Atom {
        Atom(DefaultAtom::from(s))
    }
}

impl Deref for Atom {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for Atom {
    fn from(value: &'a str) -> Self {
        Atom(DefaultAtom::from(value))
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Atom(DefaultAtom::from(value))
    }
}

impl<'a> From<&'a Atom> for Atom {
    fn from(value: &'a Atom) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl<'a> PartialEq<&'a str> for Atom {
    fn eq(&self, other: &&'a str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
