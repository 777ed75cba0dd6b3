/// A piece of a log message. `**text**` renders as bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Bold(&'a str),
}

pub fn segments(message: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = message;
    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if open > 0 {
            out.push(Segment::Plain(&rest[..open]));
        }
        out.push(Segment::Bold(&after_open[..close]));
        rest = &after_open[close + 2..];
    }
    if !rest.is_empty() {
        out.push(Segment::Plain(rest));
    }
    out
}

/// Message text with the bold markers stripped.
pub fn plain_text(message: &str) -> String {
    segments(message)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(text) | Segment::Bold(text) => text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_bold_runs() {
        assert_eq!(
            segments("Moved from **To Do** to **Done**"),
            vec![
                Segment::Plain("Moved from "),
                Segment::Bold("To Do"),
                Segment::Plain(" to "),
                Segment::Bold("Done"),
            ]
        );
    }

    #[test]
    fn unmatched_marker_stays_plain() {
        assert_eq!(segments("2 ** 3"), vec![Segment::Plain("2 ** 3")]);
    }

    #[test]
    fn message_without_markup_is_one_segment() {
        assert_eq!(segments("Board created"), vec![Segment::Plain("Board created")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn plain_text_drops_markers() {
        assert_eq!(plain_text("Tagged \"x\" with **bug**"), "Tagged \"x\" with bug");
    }
}
