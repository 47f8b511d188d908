use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&size=` query parameters, 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl PageParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be greater than or equal to 1".to_string());
        }
        if self.size < 1 || self.size > MAX_PAGE_SIZE {
            return Err(format!("size must be between 1 and {}", MAX_PAGE_SIZE));
        }
        if self.checked_offset().is_none() {
            return Err("page is out of range".to_string());
        }
        Ok(())
    }

    pub fn limit(&self) -> u32 {
        self.size
    }

    /// Rows to skip. Saturates for params that fail [`PageParams::validate`].
    pub fn offset(&self) -> u32 {
        self.checked_offset().unwrap_or(u32::MAX)
    }

    fn checked_offset(&self) -> Option<u32> {
        self.page.saturating_sub(1).checked_mul(self.size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PageParams) -> Self {
        let size = params.size.max(1) as u64;
        Self {
            items,
            total,
            page: params.page,
            size: params.size,
            pages: total.div_ceil(size),
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            pages: self.pages,
        }
    }
}
