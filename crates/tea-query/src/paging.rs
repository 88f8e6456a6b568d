//! Page selection with a one-ahead peek.

use tea_model::Pager;

/// The rows of one page plus whether more rows follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub is_last_page: bool,
}

/// Take page `page` (1-based) of `page_size` items.
///
/// One item past the page is fetched; the page is the last one exactly when
/// that extra item does not exist.
pub fn paginate<T, I>(items: I, page: u32, page_size: u32) -> Page<T>
where
    I: IntoIterator<Item = T>,
{
    let offset = Pager::new(page, page_size, false).offset();
    let size = page_size as usize;
    let mut items: Vec<T> = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(size.saturating_add(1))
        .collect();
    let is_last_page = items.len() <= size;
    items.truncate(size);
    Page {
        items,
        is_last_page,
    }
}

/// Every item on one page; used when paging is switched off.
pub fn unpaged<T>(items: Vec<T>) -> Page<T> {
    Page {
        items,
        is_last_page: true,
    }
}
