//! Contains the definition of [`Arena`], [`Map`] and [`ID`].
//!
//! The declaration graph stores every trait, struct and implementation in an
//! [`Arena`] and refers to them by a typed [`ID`]. Entries are never removed,
//! so an [`ID`] handed out once stays valid for the lifetime of the arena.

use std::{
    borrow::Borrow,
    collections::{hash_map::Entry, HashMap},
    fmt::Debug,
    hash::Hash,
    marker::PhantomData,
    ops::Index,
};

/// Represents a key type that can be used to index items in the [`Arena`].
pub trait Key:
    Debug + Clone + Copy + PartialEq + Eq + PartialOrd + Ord + Hash + Send + Sync + 'static
{
    /// Creates a new [`Key`] from the given index.
    fn from_index(index: usize) -> Self;

    /// Returns the index of the [`Key`].
    fn into_index(self) -> usize;
}

/// Represents an unique identifier to a particular entry in the [`Arena`] of
/// type `T`.
pub struct ID<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Key for ID<T> {
    fn from_index(index: usize) -> Self { Self::new(index) }

    fn into_index(self) -> usize { self.index }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ty_name = std::any::type_name::<T>();
        let short_name = ty_name.rsplit("::").next().unwrap_or(ty_name);

        f.debug_tuple(format!("ID<{short_name}>").as_str())
            .field(&self.index)
            .finish()
    }
}

impl<T> ID<T> {
    /// Creates a new [`ID`] with the given index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index, _marker: PhantomData }
    }
}

impl<T> Clone for ID<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for ID<T> {}

impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool { self.index == other.index }
}

impl<T> Eq for ID<T> {}

impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for ID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// Represents a collection of items of type `T` that can be referenced by an
/// [`ID`].
///
/// Internally, all the items are stored in a [`Vec`], and the [`ID`] is just
/// an index to the item in the [`Vec`]. Unlike [`Vec`], [`Arena`] doesn't
/// allow removing items since it would invalidate the [`ID`]s given out
/// before.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arena<T, Idx: Key = ID<T>> {
    _marker: PhantomData<Idx>,
    items: Vec<T>,
}

impl<T, Idx: Key> Default for Arena<T, Idx> {
    fn default() -> Self { Self { _marker: PhantomData, items: Vec::new() } }
}

impl<T, Idx: Key> Arena<T, Idx> {
    /// Creates a new empty [`Arena`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Returns the number of items in the [`Arena`].
    #[must_use]
    pub fn len(&self) -> usize { self.items.len() }

    /// Returns `true` if the [`Arena`] contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Inserts a new item into the [`Arena`] and returns its `Idx`.
    pub fn insert(&mut self, item: T) -> Idx {
        let index = self.items.len();
        self.items.push(item);
        Idx::from_index(index)
    }

    /// Returns a reference to the item with the given `Idx`.
    #[must_use]
    pub fn get(&self, id: Idx) -> Option<&T> { self.items.get(id.into_index()) }

    /// Returns an iterator over the items in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> { self.items.iter() }

    /// Returns an iterator over the `Idx`s and items in insertion order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (Idx, &T)> {
        self.items.iter().enumerate().map(|(i, item)| (Idx::from_index(i), item))
    }

    /// Returns an iterator over the `Idx`s of the items in the [`Arena`].
    pub fn keys(&self) -> impl ExactSizeIterator<Item = Idx> {
        (0..self.items.len()).map(Idx::from_index)
    }
}

impl<T, Idx: Key> Index<Idx> for Arena<T, Idx> {
    type Output = T;

    fn index(&self, id: Idx) -> &Self::Output {
        self.get(id).unwrap_or_else(|| panic!("{id:?} is not in the arena"))
    }
}

impl<T, Idx: Key> FromIterator<T> for Arena<T, Idx> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { _marker: PhantomData, items: iter.into_iter().collect() }
    }
}

impl<'a, T, Idx: Key> IntoIterator for &'a Arena<T, Idx> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter { self.items.iter() }
}

/// An [`Arena`] whose items can additionally be looked up by a secondary key
/// (most commonly the declared name).
///
/// Accessing by [`ID`] is a plain index; accessing by the secondary key costs
/// a hash map lookup.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Index)]
pub struct Map<T, Secondary: Hash + Eq = String, Primary: Key = ID<T>> {
    #[index]
    arena: Arena<T, Primary>,

    items: HashMap<Secondary, Primary>,
}

impl<T, Secondary: Hash + Eq, Primary: Key> Map<T, Secondary, Primary> {
    /// Creates a new empty [`Map`].
    #[must_use]
    pub fn new() -> Self { Self { arena: Arena::new(), items: HashMap::new() } }

    /// Returns the number of items in the [`Map`].
    #[must_use]
    pub fn len(&self) -> usize { self.arena.len() }

    /// Returns `true` if the [`Map`] contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.arena.is_empty() }

    /// Inserts a new item with the given key.
    ///
    /// # Errors
    ///
    /// Returns the [`ID`] of the existing entry and the rejected item if the
    /// key is already taken.
    pub fn insert(
        &mut self,
        key: Secondary,
        item: T,
    ) -> Result<Primary, (Primary, T)> {
        match self.items.entry(key) {
            Entry::Occupied(entry) => Err((*entry.get(), item)),
            Entry::Vacant(entry) => {
                let id = self.arena.insert(item);
                entry.insert(id);
                Ok(id)
            }
        }
    }

    /// Returns the ID of the item registered under the given key.
    pub fn get_id<Q: ?Sized + Hash + Eq>(&self, key: &Q) -> Option<Primary>
    where
        Secondary: Borrow<Q>,
    {
        self.items.get(key).copied()
    }

    /// Returns a reference to the item with the given ID.
    #[must_use]
    pub fn get(&self, id: Primary) -> Option<&T> { self.arena.get(id) }

    /// Returns an iterator over the IDs and items in insertion order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (Primary, &T)> {
        self.arena.entries()
    }
}

impl<T, K: Eq + Hash, Idx: Key> Default for Map<T, K, Idx> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod test;
