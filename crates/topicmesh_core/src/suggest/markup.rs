//! Explicit mention markup: `@[Display Name](kind:id)`.

use crate::model::entity::{EntityKind, EntityRef};
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters of surrounding text kept on each side of a mention.
pub const CONTEXT_RADIUS: usize = 30;

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@\[([^\]]+)\]\(([^:)\s]+):([^)\s]+)\)").expect("valid mention markup regex")
});

/// One markup occurrence with a known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupMention {
    pub kind: EntityKind,
    pub id: String,
    pub display_name: String,
    /// Byte range of the whole markup in the source text.
    pub start: usize,
    pub end: usize,
}

impl MarkupMention {
    /// The mention as an exact, existing reference with surrounding context.
    pub fn to_reference(&self, text: &str) -> EntityRef {
        EntityRef::existing(self.kind, self.id.clone(), self.display_name.clone())
            .with_context(excerpt(text, self.start, self.end))
    }
}

/// Finds every well-formed mention in `text`, in order of appearance.
///
/// Markup with an unknown kind or a blank name is skipped.
pub fn extract_markup_mentions(text: &str) -> Vec<MarkupMention> {
    MARKUP_RE
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let display_name = captures.get(1)?.as_str().trim();
            let kind = EntityKind::parse(captures.get(2)?.as_str())?;
            let id = captures.get(3)?.as_str();
            if display_name.is_empty() {
                return None;
            }
            Some(MarkupMention {
                kind,
                id: id.to_string(),
                display_name: display_name.to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Replaces every markup occurrence with spaces, keeping byte offsets.
pub(crate) fn blank_out_markup(text: &str) -> String {
    MARKUP_RE
        .replace_all(text, |captures: &regex::Captures<'_>| {
            " ".repeat(captures[0].len())
        })
        .into_owned()
}

/// Whitespace-collapsed excerpt of up to [`CONTEXT_RADIUS`] characters on
/// each side of `text[start..end]`.
pub(crate) fn excerpt(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(CONTEXT_RADIUS)
        .last()
        .map_or(start, |(index, _)| index);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_RADIUS)
        .map_or(text.len(), |(index, _)| end + index);

    text[from..to].split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{blank_out_markup, excerpt, extract_markup_mentions};
    use crate::model::entity::EntityKind;

    #[test]
    fn extracts_known_kinds_in_order() {
        let text = "Met @[Jane Doe](contact:p1) from @[Acme](company:c1) at @[x](planet:1)";
        let mentions = extract_markup_mentions(text);

        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].kind, EntityKind::Contact);
        assert_eq!(mentions[0].id, "p1");
        assert_eq!(mentions[0].display_name, "Jane Doe");
        assert_eq!(&text[mentions[1].start..mentions[1].end], "@[Acme](company:c1)");
    }

    #[test]
    fn blanking_preserves_length() {
        let text = "see @[Acme](company:c1) now";
        let blanked = blank_out_markup(text);
        assert_eq!(blanked.len(), text.len());
        assert!(!blanked.contains("Acme"));
        assert!(blanked.ends_with(" now"));
    }

    #[test]
    fn excerpt_is_bounded_and_char_safe() {
        let text = "é".repeat(40) + "Nike" + &"ü".repeat(40);
        let start = text.find("Nike").unwrap();
        let snippet = excerpt(&text, start, start + 4);
        assert_eq!(snippet.chars().count(), 30 + 4 + 30);

        assert_eq!(excerpt("Nike", 0, 4), "Nike");
    }
}
