use std::sync::Arc;

use ratatui::widgets::ListState;

use livescroll_news::{FeedReader, NewsItem};

/// Largest page the viewer will ask for.
pub const MAX_PAGE_SIZE: usize = 100;

pub struct App {
    feed: Arc<dyn FeedReader>,
    /// Label shown in the list border.
    pub feed_label: String,
    /// The page currently on screen.
    pub items: Vec<NewsItem>,
    /// Index of the first item of the page within the feed.
    pub offset: usize,
    pub page_size: usize,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    pub status: String,
}

impl App {
    pub fn new(feed: Arc<dyn FeedReader>, feed_label: impl Into<String>, page_size: usize) -> Self {
        Self {
            feed,
            feed_label: feed_label.into(),
            items: Vec::new(),
            offset: 0,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
        }
    }

    /// Re-read the current page from the feed.
    ///
    /// Called every tick so the view follows the cache's refreshes.  If the
    /// feed shrank below the current offset, fall back to the first page.
    pub fn refresh(&mut self) {
        self.items = self.feed.get(self.page_size, self.offset);
        if self.items.is_empty() && self.offset > 0 {
            self.offset = 0;
            self.items = self.feed.get(self.page_size, 0);
        }

        match self.list_state.selected() {
            Some(_) if self.items.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.items.len() => self.list_state.select(Some(self.items.len() - 1)),
            _ => {}
        }

        self.status = if self.items.is_empty() {
            "No news yet".into()
        } else {
            format!(
                "Items {}–{}",
                self.offset + 1,
                self.offset + self.items.len()
            )
        };
    }

    pub fn page_number(&self) -> usize {
        self.offset / self.page_size + 1
    }

    pub fn selected_item(&self) -> Option<&NewsItem> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }

    // -- paging --------------------------------------------------------------

    pub fn next_page(&mut self) {
        let next = self.offset + self.page_size;
        if self.feed.get(1, next).is_empty() {
            return;
        }
        self.offset = next;
        self.list_state.select(None);
        self.refresh();
    }

    pub fn previous_page(&mut self) {
        if self.offset == 0 {
            return;
        }
        self.offset = self.offset.saturating_sub(self.page_size);
        self.list_state.select(None);
        self.refresh();
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(self.items.len() - 1));
        }
    }
}
