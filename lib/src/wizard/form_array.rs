// lib/src/wizard/form_array.rs
use std::slice::{Iter, IterMut};
use serde::{Deserialize, Serialize};

/// Ordered, growable list of sub-forms. Serialises as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormArray<T> {
    items: Vec<T>,
}

impl<T> Default for FormArray<T> {
    fn default() -> Self {
        FormArray { items: Vec::new() }
    }
}

impl<T> FormArray<T> {
    pub fn new() -> Self {
        FormArray::default()
    }

    pub fn push(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Later entries shift up; an index past the end changes nothing.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: PartialEq> FormArray<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T> From<Vec<T>> for FormArray<T> {
    fn from(items: Vec<T>) -> Self {
        FormArray { items }
    }
}

impl<T> FromIterator<T> for FormArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        FormArray { items: iter.into_iter().collect() }
    }
}

impl<'a, T> IntoIterator for &'a FormArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
