use chrono::NaiveDate;
use rayon::prelude::*;

use crate::date::normalize_day;
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Case-insensitive substring.
    Contains,
    /// Exact string equality, used for enumerations.
    Exact,
    /// Same calendar day after normalizing both timestamps.
    SameDay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub name: String,
    pub accessor: String,
    pub rule: MatchRule,
}

/// Declared filter fields and their current values. `""` means unset.
/// Values can only be set for declared names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterMap {
    specs: Vec<FilterSpec>,
    values: Vec<String>,
}

impl FilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, accessor: &str, rule: MatchRule) -> Self {
        if self.position(name).is_none() {
            self.specs.push(FilterSpec {
                name: name.to_string(),
                accessor: accessor.to_string(),
                rule,
            });
            self.values.push(String::new());
        }
        self
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Returns false if `name` is not a declared filter field.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.values[idx] = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.values[idx].as_str())
    }

    pub fn clear(&mut self, name: &str) -> bool {
        self.set(name, "")
    }

    pub fn clear_all(&mut self) {
        self.values.iter_mut().for_each(String::clear);
    }

    pub fn is_active(&self) -> bool {
        self.values.iter().any(|v| !v.is_empty())
    }

    pub fn active(&self) -> impl Iterator<Item = (&FilterSpec, &str)> {
        self.specs
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| !v.is_empty())
            .map(|(s, v)| (s, v.as_str()))
    }
}

struct Constraint<'a> {
    accessor: &'a str,
    rule: MatchRule,
    value: &'a str,
    needle: String,
    day: Option<NaiveDate>,
}

impl<'a> Constraint<'a> {
    fn new(spec: &'a FilterSpec, value: &'a str) -> Self {
        Constraint {
            accessor: &spec.accessor,
            rule: spec.rule,
            value,
            needle: value.to_lowercase(),
            day: match spec.rule {
                MatchRule::SameDay => normalize_day(value),
                _ => None,
            },
        }
    }

    fn matches<T: Record>(&self, record: &T) -> bool {
        let Some(field) = record.field(self.accessor) else {
            return false;
        };
        match self.rule {
            MatchRule::Contains => field.to_lowercase().contains(&self.needle),
            MatchRule::Exact => field == self.value,
            MatchRule::SameDay => match (self.day, normalize_day(&field)) {
                (Some(wanted), Some(day)) => wanted == day,
                _ => field.trim() == self.value.trim(),
            },
        }
    }
}

/// Indices into `records` of every record matching all active filters, in input order.
pub fn filter_indices<T: Record>(records: &[T], filters: &FilterMap) -> Vec<usize> {
    let constraints: Vec<Constraint> = filters
        .active()
        .map(|(spec, value)| Constraint::new(spec, value))
        .collect();
    if constraints.is_empty() {
        return (0..records.len()).collect();
    }
    records
        .par_iter()
        .enumerate()
        .filter(|(_, record)| constraints.iter().all(|c| c.matches(*record)))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
pub fn filter<T: Record>(records: &[T], filters: &FilterMap) -> Vec<T> {
    filter_indices(records, filters)
        .into_iter()
        .map(|idx| records[idx].clone())
        .collect()
}
