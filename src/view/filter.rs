use crate::model::{
    Battery, Charger, GatePass, Generator, Invoice, Notification, Service, Shop, Task, Timestamp, User,
};
use crate::status::{Classify, StatusPolicy};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Text and date accessors used by search, filtering and sorting.
pub trait Searchable {
    /// Fields matched by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// The date used for range filters and date sorting.
    fn primary_date(&self) -> Option<Timestamp> {
        None
    }
}

fn fields<'a>(values: &[&'a Option<String>]) -> Vec<&'a str> {
    values.iter().copied().filter_map(Option::as_deref).collect()
}

impl Searchable for Generator {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[&self.name, &self.serial_number, &self.model, &self.location, &self.status]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.next_service_date
    }
}

impl Searchable for Battery {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[&self.serial_number, &self.brand, &self.generator_id]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.expiry_date
    }
}

impl Searchable for Charger {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[&self.name, &self.serial_number, &self.location, &self.status]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.last_seen
    }
}

impl Searchable for GatePass {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[
            &self.pass_number,
            &self.asset_type,
            &self.asset_id,
            &self.issued_to,
            &self.purpose,
        ]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.issued_at
    }
}

impl Searchable for Service {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[
            &self.service_type,
            &self.generator_id,
            &self.technician_id,
            &self.status,
            &self.notes,
        ]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.due_date()
    }
}

impl Searchable for Task {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[
            &self.title,
            &self.description,
            &self.assigned_to,
            &self.generator_id,
            &self.status,
            &self.priority,
        ]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.due_date
    }
}

impl Searchable for Invoice {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[&self.invoice_number, &self.customer, &self.service_id, &self.status]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.issued_at
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[&self.name, &self.email, &self.role, &self.phone]));
        out
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.created_at
    }
}

impl Searchable for Shop {
    fn search_fields(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        out.extend(fields(&[&self.name, &self.address, &self.contact_name, &self.phone]));
        out
    }
}

impl Searchable for Notification {
    fn search_fields(&self) -> Vec<&str> {
        fields(&[&self.title, &self.message, &self.kind])
    }

    fn primary_date(&self) -> Option<Timestamp> {
        self.created_at
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Every token must appear in at least one field.
fn matches_tokens<T: Searchable>(item: &T, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let haystack: Vec<String> = item.search_fields().iter().map(|f| f.to_lowercase()).collect();
    tokens
        .iter()
        .all(|token| haystack.iter().any(|field| field.contains(token.as_str())))
}

/// Free-text search over any searchable records, keeping input order.
pub fn search<'a, T: Searchable>(items: &'a [T], text: &str) -> Vec<&'a T> {
    let tokens = tokenize(text);
    items.iter().filter(|item| matches_tokens(*item, &tokens)).collect()
}

/// A combined search, status and date-range filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<S> {
    tokens: Vec<String>,
    statuses: BTreeSet<S>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl<S: Copy + Ord> Default for Filter<S> {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            statuses: BTreeSet::new(),
            from: None,
            to: None,
        }
    }
}

impl<S: Copy + Ord> Filter<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: &str) -> Self {
        self.tokens = tokenize(text);
        self
    }

    /// Keeps records with this status. Repeated calls widen the set.
    pub fn status(mut self, status: S) -> Self {
        self.statuses.insert(status);
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    /// Keeps records whose primary date falls within `[from, to]`, both optional.
    /// Records without a date are dropped once a bound is set.
    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.statuses.is_empty() && self.from.is_none() && self.to.is_none()
    }

    pub fn matches<T>(&self, item: &T, policy: &StatusPolicy, today: NaiveDate) -> bool
    where
        T: Searchable + Classify<Status = S>,
    {
        if !self.statuses.is_empty() && !self.statuses.contains(&item.status(policy, today)) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = item.primary_date().map(|d| d.date_naive()) else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        matches_tokens(item, &self.tokens)
    }

    pub fn apply<'a, T>(&self, items: &'a [T], policy: &StatusPolicy, today: NaiveDate) -> Vec<&'a T>
    where
        T: Searchable + Classify<Status = S>,
    {
        items
            .iter()
            .filter(|item| self.matches(*item, policy, today))
            .collect()
    }
}

/// Sorts by primary date; records without a date always go last.
pub fn sort_by_date<T: Searchable>(items: &mut [T], descending: bool) {
    items.sort_by(|a, b| match (a.primary_date(), b.primary_date()) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Case-insensitive sort on a text key; records without the key go last.
pub fn sort_by_text<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> Option<&str>,
{
    items.sort_by_cached_key(|item| match key(item) {
        Some(text) => (false, text.to_lowercase()),
        None => (true, String::new()),
    });
}
