//! Arbitrarily nested values for depth-limited flattening

/// A value or a list of nested values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Nested<T> {
    Value(T),
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    pub fn value(value: T) -> Self {
        Nested::Value(value)
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Nested<T>>,
    {
        Nested::List(items.into_iter().collect())
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Nested::Value(value) => Some(value),
            Nested::List(_) => None,
        }
    }

    /// Push `self` into `out`, unwrapping up to `depth` levels of lists.
    pub fn flatten_into(self, depth: usize, out: &mut Vec<Nested<T>>) {
        match self {
            Nested::List(items) if depth > 0 => {
                for item in items {
                    item.flatten_into(depth - 1, out);
                }
            }
            other => out.push(other),
        }
    }
}

impl<T> From<Vec<Nested<T>>> for Nested<T> {
    fn from(items: Vec<Nested<T>>) -> Self {
        Nested::List(items)
    }
}
