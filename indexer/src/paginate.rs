use anyhow::{bail, Result};

/// Fixed-size pages over a slice. The last page may be shorter.
#[derive(Debug)]
pub struct Paginator<'a, T> {
    pages: Vec<&'a [T]>,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(items: &'a [T], page_size: usize) -> Result<Self> {
        if page_size == 0 {
            bail!("page size must be at least 1");
        }
        Ok(Self { pages: items.chunks(page_size).collect() })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<'a, T> IntoIterator for Paginator<'a, T> {
    type Item = &'a [T];
    type IntoIter = std::vec::IntoIter<&'a [T]>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

pub fn paginate<T>(items: &[T], page_size: usize) -> Result<Paginator<'_, T>> {
    Paginator::new(items, page_size)
}
