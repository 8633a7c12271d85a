use serde::Serialize;

/// 分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub start_index: usize,
    pub end_index: usize,
}

impl PaginationInfo {
    /// 计算分页，不校验页码范围（越界时切片为空）
    pub fn calculate(total_items: usize, current_page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page);

        Self {
            current_page,
            total_pages,
            per_page,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
            start_index: current_page.saturating_sub(1).saturating_mul(per_page),
            end_index: current_page.saturating_mul(per_page).min(total_items),
        }
    }

    /// 当前页的切片；越界时为空
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end_index.min(items.len());
        items.get(self.start_index..end).unwrap_or(&[])
    }

    pub fn is_multi_page(&self) -> bool {
        self.total_pages > 1
    }

    pub fn links(&self) -> Vec<PageLink> {
        page_links(self.current_page, self.total_pages)
    }
}

/// 页码导航中的一项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "page", rename_all = "lowercase")]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

const MAX_VISIBLE: usize = 5;

/// 可见页码窗口，超过 5 页时用省略号折叠
pub fn page_links(current: usize, total_pages: usize) -> Vec<PageLink> {
    use PageLink::{Ellipsis, Page};

    if total_pages <= MAX_VISIBLE {
        return (1..=total_pages).map(Page).collect();
    }

    if current <= 3 {
        let mut links: Vec<PageLink> = (1..=4).map(Page).collect();
        links.extend([Ellipsis, Page(total_pages)]);
        links
    } else if current >= total_pages - 2 {
        let mut links = vec![Page(1), Ellipsis];
        links.extend((total_pages - 3..=total_pages).map(Page));
        links
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(total_pages),
        ]
    }
}
