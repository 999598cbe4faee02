//! Paginated comment list shared by both panels.
//!
//! Page 1 replaces the list, later pages append. Each load is issued a
//! [`PageTicket`]; only the response for the most recently issued ticket is
//! applied, so an overlapping request can never shuffle the list.

use tracing::{debug, warn};

use crate::types::{Comment, CommentPage, Pagination};

/// Handle for one in-flight page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    page: u32,
    seq: u64,
}

impl PageTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Comment list with pagination state and request fencing.
#[derive(Debug)]
pub struct CommentPager {
    comments: Vec<Comment>,
    pagination: Pagination,
    page_size: u32,
    next_seq: u64,
    pending: Option<PageTicket>,
    disposed: bool,
}

impl CommentPager {
    pub fn new(page_size: u32) -> Self {
        Self {
            comments: Vec::new(),
            pagination: Pagination::default(),
            page_size: page_size.max(1),
            next_seq: 0,
            pending: None,
            disposed: false,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Whether a page request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_more(&self) -> bool {
        self.pagination.pagina_actual < self.pagination.total_paginas
    }

    /// Start a request for `page`, superseding any outstanding one.
    ///
    /// After [`dispose`](Self::dispose) the ticket is never pending, so
    /// nothing reports as loading.
    pub fn begin(&mut self, page: u32) -> PageTicket {
        self.next_seq += 1;
        let ticket = PageTicket {
            page: page.max(1),
            seq: self.next_seq,
        };
        if self.disposed {
            debug!("Page {} requested after dispose", ticket.page);
            return ticket;
        }
        if let Some(previous) = self.pending.replace(ticket) {
            debug!(
                "Page {} request superseded by page {}",
                previous.page, ticket.page
            );
        }
        ticket
    }

    /// Apply a page response.
    ///
    /// Returns `false` (and leaves the list untouched) when the ticket is no
    /// longer current or the pager was disposed.
    pub fn complete(&mut self, ticket: PageTicket, page: CommentPage) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.pending = None;

        if ticket.page == 1 {
            self.comments = page.comentarios;
        } else {
            self.comments.extend(page.comentarios);
        }
        self.pagination = Pagination {
            pagina_actual: ticket.page,
            total_paginas: page.total_pages.max(ticket.page),
            total_comentarios: page.total,
        };
        debug!(
            "Loaded page {}/{} ({} comments total)",
            self.pagination.pagina_actual, self.pagination.total_paginas, page.total
        );
        true
    }

    /// Mark a request as failed. Returns `false` if the ticket was stale.
    pub fn fail(&mut self, ticket: PageTicket) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Overwrite the like count of a comment or reply.
    ///
    /// Returns `true` if an item matched.
    pub fn apply_likes(&mut self, item_id: &str, likes: u64) -> bool {
        self.comments
            .iter_mut()
            .any(|comment| comment.set_likes(item_id, likes))
    }

    /// Ignore every response from now on.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.pending = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn accepts(&self, ticket: PageTicket) -> bool {
        if self.disposed {
            debug!("Ignoring page {} response after dispose", ticket.page);
            return false;
        }
        if self.pending != Some(ticket) {
            warn!("Dropping stale response for page {}", ticket.page);
            return false;
        }
        true
    }
}
