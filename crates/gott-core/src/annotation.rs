//! Token classification for interval descriptions.
//!
//! `fix bug +urgent proj:infra ref:T-12` splits into annotation `fix bug`,
//! tag `urgent`, project `infra` and reference `T-12`.

use crate::interval::Interval;

pub const TAG_PREFIX: &str = "+";
pub const PROJECT_PREFIX_SHORT: &str = "proj:";
pub const PROJECT_PREFIX: &str = "project:";
pub const REF_PREFIX: &str = "ref:";

impl Interval {
    /// Parses `tokens` onto this interval.
    ///
    /// The annotation is rebuilt from scratch and `raw` becomes the space-join
    /// of `tokens`. Tags append and project/reference overwrite, so repeated
    /// calls (`gott annotate`) accumulate tags.
    pub fn annotate<S: AsRef<str>>(&mut self, tokens: &[S]) {
        self.raw = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.annotation.clear();

        for token in tokens {
            let token = token.as_ref();
            if let Some(tag) = token.strip_prefix(TAG_PREFIX) {
                self.tags.push(tag.to_string());
            } else if let Some(project) = token.strip_prefix(PROJECT_PREFIX_SHORT) {
                self.project = Some(project.to_string());
            } else if let Some(project) = token.strip_prefix(PROJECT_PREFIX) {
                self.project = Some(project.to_string());
            } else if let Some(reference) = token.strip_prefix(REF_PREFIX) {
                self.reference = Some(reference.to_string());
            } else if !token.is_empty() {
                if !self.annotation.is_empty() {
                    self.annotation.push(' ');
                }
                self.annotation.push_str(token);
            }
        }
    }
}
