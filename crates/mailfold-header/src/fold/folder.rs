use std::cmp::Reverse;
use std::io::{self, Write};

use super::{Fragment, Split, Token};
use crate::codec;
use crate::error::Result;
use crate::limits::{CRLF, FOLD, LEAST_PRIORITY, MAX_LINE_LEN};

#[derive(Debug)]
enum State {
    Open,
    Closed,
    Failed(io::Error),
}

enum FoldPoint {
    Marker(usize),
    Split { index: usize, split: Split },
}

/// Lays out a header field on lines of at most 78 octets.
///
/// Tokens are buffered until the current line overflows, then the folder
/// breaks at the most preferred legal marker before the overflow. A break is
/// legal only with non-white-space text on both sides of it, so no line is
/// ever blank. If no marker qualifies, a splittable fragment is split
/// instead. Text that cannot be broken is written as-is, even if over-long.
///
/// Once a write to the sink fails, the folder stops writing and the error is
/// available from [`Folder::error`].
#[derive(Debug)]
pub struct Folder<W: Write> {
    sink: W,
    line_len: usize,
    pending: Vec<Token>,
    state: State,
}

impl<W: Write> Folder<W> {
    /// Creates a folder writing to `sink`.
    pub const fn new(sink: W) -> Self {
        Self {
            sink,
            line_len: 0,
            pending: Vec::new(),
            state: State::Open,
        }
    }

    /// Appends tokens, folding whenever the line overflows.
    ///
    /// Literal text made only of space-separated encoded words is taken
    /// apart so the folder may break between the words.
    pub fn write<I>(&mut self, tokens: I)
    where
        I: IntoIterator,
        I::Item: Into<Token>,
    {
        for token in tokens {
            if !matches!(self.state, State::Open) {
                return;
            }
            match token.into() {
                Token::Fragment(Fragment::Text(text)) => self.push_text(text),
                Token::Fragment(fragment) => self.pending.push(Token::Fragment(fragment)),
                Token::Priority(priority) => {
                    self.pending.push(Token::Priority(priority));
                    continue;
                }
            }
            self.fold();
        }
    }

    /// Flushes what is buffered and terminates the field with CRLF.
    ///
    /// Closing twice does nothing.
    pub fn close(&mut self) {
        if matches!(self.state, State::Open) && self.flush_line(CRLF) {
            self.state = State::Closed;
        }
    }

    /// The sink error that stopped this folder, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&io::Error> {
        match &self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the folder has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Returns a reference to the sink.
    pub const fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Closes the folder and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns the sink error if any write failed.
    pub fn finish(mut self) -> Result<W> {
        self.close();
        let Self { sink, state, .. } = self;
        match state {
            State::Failed(err) => Err(err.into()),
            State::Open | State::Closed => Ok(sink),
        }
    }

    fn push_text(&mut self, text: String) {
        let words: Vec<&str> = text.split(' ').collect();
        if words.len() > 1 && words.iter().all(|w| codec::parse_encoded_word(w).is_some()) {
            for (i, word) in words.iter().enumerate() {
                if i > 0 {
                    self.pending.push(Token::Priority(LEAST_PRIORITY));
                    self.pending.push(Token::Fragment(Fragment::from(" ")));
                }
                self.pending.push(Token::Fragment(Fragment::from(*word)));
            }
        } else {
            self.pending.push(Token::Fragment(Fragment::Text(text)));
        }
    }

    fn fold(&mut self) {
        while matches!(self.state, State::Open) {
            let Some(point) = self.find_fold_point() else {
                return;
            };
            self.apply(point);
        }
    }

    fn find_fold_point(&self) -> Option<FoldPoint> {
        let mut len = self.line_len;
        for (index, token) in self.pending.iter().enumerate() {
            let Token::Fragment(fragment) = token else {
                continue;
            };
            len += fragment.len();
            if len <= MAX_LINE_LEN {
                continue;
            }
            if let Some(point) = self
                .marker_before(index)
                .or_else(|| self.split_through(index))
            {
                return Some(point);
            }
            tracing::trace!(index, len, "no legal fold point");
        }
        None
    }

    /// The legal marker before `end` with the best priority, closest to
    /// `end` on ties.
    fn marker_before(&self, end: usize) -> Option<FoldPoint> {
        (0..end)
            .rev()
            .filter_map(|index| match self.pending[index] {
                Token::Priority(priority) if priority > 0 && self.can_fold(index) => {
                    Some((priority, index))
                }
                _ => None,
            })
            .min_by_key(|&(priority, _)| priority)
            .map(|(_, index)| FoldPoint::Marker(index))
    }

    /// Splits the most preferred splittable fragment up to and including
    /// `end`, preferring the one closest to `end` on ties.
    fn split_through(&self, end: usize) -> Option<FoldPoint> {
        let mut candidates: Vec<(u32, usize)> = self.pending[..=end]
            .iter()
            .enumerate()
            .filter_map(|(index, token)| match token {
                Token::Fragment(fragment) => Some((fragment.priority(), index)),
                Token::Priority(_) => None,
            })
            .filter(|(priority, _)| *priority > 0)
            .collect();
        candidates.sort_by_key(|&(priority, index)| (priority, Reverse(index)));

        candidates.into_iter().find_map(|(_, index)| {
            let used = self.line_len + self.width_before(index);
            let budget = MAX_LINE_LEN.checked_sub(used).filter(|b| *b > 0)?;
            let Token::Fragment(fragment) = &self.pending[index] else {
                return None;
            };
            fragment
                .split(budget)
                .map(|split| FoldPoint::Split { index, split })
        })
    }

    fn width_before(&self, index: usize) -> usize {
        self.pending[..index]
            .iter()
            .map(|token| match token {
                Token::Fragment(fragment) => fragment.len(),
                Token::Priority(_) => 0,
            })
            .sum()
    }

    fn can_fold(&self, index: usize) -> bool {
        let has_content = |tokens: &[Token]| {
            tokens
                .iter()
                .any(|token| matches!(token, Token::Fragment(f) if f.has_content()))
        };
        has_content(&self.pending[..index]) && has_content(&self.pending[index + 1..])
    }

    fn apply(&mut self, point: FoldPoint) {
        match point {
            FoldPoint::Marker(index) => {
                tracing::trace!(index, line_len = self.line_len, "folding at marker");
                let mut rest = self.pending.split_off(index + 1);
                self.pending.truncate(index);
                if !self.flush_line(FOLD) {
                    return;
                }
                if matches!(rest.first(), Some(Token::Fragment(Fragment::Text(s))) if s == " ") {
                    rest.remove(0);
                }
                self.pending = rest;
            }
            FoldPoint::Split { index, split } => {
                tracing::trace!(index, line_len = self.line_len, "splitting fragment");
                let rest = self.pending.split_off(index + 1);
                self.pending.truncate(index);
                self.pending
                    .push(Token::Fragment(Fragment::Text(split.head)));
                if let Some(tail) = split.tail {
                    if !self.flush_line(FOLD) {
                        return;
                    }
                    self.pending.push(Token::Fragment(tail));
                }
                self.pending.extend(rest);
            }
        }
    }

    /// Writes the pending text followed by `terminator` and starts a new line.
    fn flush_line(&mut self, terminator: &str) -> bool {
        let mut line = String::new();
        for token in self.pending.drain(..) {
            if let Token::Fragment(fragment) = token {
                line.push_str(&fragment.value());
            }
        }
        line.push_str(terminator);
        if let Err(err) = self.sink.write_all(line.as_bytes()) {
            tracing::warn!(error = %err, "header sink write failed");
            self.state = State::Failed(err);
            return false;
        }
        self.line_len = terminator.len() - CRLF.len();
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::codec::WordEncoding;
    use crate::fold::{MimeParam, WordEncodable};
    use crate::tokens;

    fn i(n: usize) -> String {
        "i".repeat(n)
    }

    fn fold_with(header: &str, build: impl FnOnce(&mut Folder<Vec<u8>>)) -> String {
        let mut folder = Folder::new(Vec::new());
        folder.write([header]);
        build(&mut folder);
        String::from_utf8(folder.finish().unwrap()).unwrap()
    }

    fn fold_to(build: impl FnOnce(&mut Folder<Vec<u8>>)) -> String {
        fold_with("To: ", build)
    }

    fn q(text: &str, must_encode: bool, priority: u32) -> WordEncodable {
        WordEncodable::new(text, WordEncoding::Q, must_encode, priority)
    }

    fn b(text: &str, priority: u32) -> WordEncodable {
        WordEncodable::new(text, WordEncoding::B, true, priority)
    }

    #[test]
    fn test_empty() {
        assert_eq!(fold_to(|_| {}), "To: \r\n");
    }

    #[test]
    fn test_no_fold_needed() {
        assert_eq!(fold_to(|f| f.write(tokens!["foo", 1, "bar"])), "To: foobar\r\n");
    }

    #[test]
    fn test_nothing_foldable() {
        let out = fold_to(|f| f.write(tokens![i(74), "world"]));
        assert_eq!(out, format!("To: {}world\r\n", i(74)));
    }

    #[test]
    fn test_priority_respected() {
        let out = fold_to(|f| f.write(tokens![i(37), 2, i(37), 1, "foo"]));
        assert_eq!(out, format!("To: {}\r\n foo\r\n", i(74)));
    }

    #[test]
    fn test_priority_at_first_overflow() {
        let mut folder = Folder::new(Vec::new());
        folder.write(tokens![i(74), 2, i(37), 1, "foo"]);
        let out = String::from_utf8(folder.finish().unwrap()).unwrap();
        assert_eq!(out, format!("{}\r\n {}foo\r\n", i(74), i(37)));
    }

    #[test]
    fn test_illegal_best_marker_falls_back_to_legal_one() {
        let out = fold_to(|f| f.write(tokens![i(40), 2, i(30), 1, "      "]));
        assert_eq!(out, format!("To: {}\r\n {}      \r\n", i(40), i(30)));

        let mut folder = Folder::new(Vec::new());
        folder.write(tokens![" ", 1, i(40), 2, i(45)]);
        let out = String::from_utf8(folder.finish().unwrap()).unwrap();
        assert_eq!(out, format!(" {}\r\n {}\r\n", i(40), i(45)));
        assert!(out.split("\r\n").all(|line| line.len() <= 78));
    }

    #[test]
    fn test_fold_right_after_name() {
        let out = fold_with("Reply-To:", |f| {
            f.write(Token::fws(1));
            f.write([i(80)]);
        });
        assert_eq!(out, format!("Reply-To:\r\n {}\r\n", i(80)));
    }

    #[test]
    fn test_zero_priority_ignored() {
        let out = fold_to(|f| {
            f.write(tokens![i(40), 0, i(40), q("iii", true, 0)]);
        });
        assert_eq!(out, format!("To: {}=?utf-8?q?iii?=\r\n", i(80)));
    }

    #[test]
    fn test_unfoldable_text_does_not_stop_folding() {
        let out = fold_to(|f| f.write(tokens![i(80), 1, i(80)]));
        assert_eq!(out, format!("To: {}\r\n {}\r\n", i(80), i(80)));
    }

    #[test]
    fn test_multiple_folds() {
        let out = fold_to(|f| f.write(tokens![i(37), 1, i(37), 2, i(80)]));
        assert_eq!(out, format!("To: {}\r\n {}\r\n {}\r\n", i(37), i(37), i(80)));
    }

    #[test]
    fn test_no_fold_with_only_white_space_before() {
        let out = fold_to(|f| f.write(tokens!["foo", 1, i(80)]));
        assert_eq!(out, format!("To: foo\r\n {}\r\n", i(80)));

        let mut folder = Folder::new(Vec::new());
        folder.write(tokens![" ", 1, i(80)]);
        let out = String::from_utf8(folder.finish().unwrap()).unwrap();
        assert_eq!(out, format!(" {}\r\n", i(80)));
    }

    #[test]
    fn test_no_fold_with_only_white_space_after() {
        let out = fold_to(|f| {
            f.write(tokens![i(37), 1, i(37)]);
            f.write(Token::fws(1));
            f.write(tokens![1, "\t", 1, " \t"]);
        });
        assert_eq!(out, format!("To: {}\r\n {} \t \t\r\n", i(37), i(37)));
    }

    #[test]
    fn test_fws_kept_without_fold() {
        let out = fold_to(|f| {
            f.write(["foo"]);
            f.write(Token::fws(1));
            f.write(tokens![1, "bar"]);
        });
        assert_eq!(out, "To: foo bar\r\n");
    }

    #[test]
    fn test_fws_consumed_by_fold() {
        let out = fold_to(|f| {
            f.write([i(74)]);
            f.write(Token::fws(1));
            f.write(["foo"]);
        });
        assert_eq!(out, format!("To: {}\r\n foo\r\n", i(74)));
    }

    #[test]
    fn test_literal_encoded_words_fold_between() {
        let out = fold_to(|f| f.write([i(50), "=?utf-8?q?foo?= =?utf-8?q?bar?=".to_string()]));
        assert_eq!(
            out,
            format!("To: {}=?utf-8?q?foo?=\r\n =?utf-8?q?bar?=\r\n", i(50))
        );
    }

    #[test]
    fn test_literal_encoded_word_split() {
        let out = fold_with("X-Header: ", |f| {
            f.write([i(55), "=?utf-8?q?foo_bar?=".to_string()]);
        });
        assert_eq!(
            out,
            format!("X-Header: {}=?utf-8?q?f?=\r\n =?utf-8?q?oo_bar?=\r\n", i(55))
        );
    }

    #[test]
    fn test_word_plain_not_encoded() {
        let out = fold_with("X-Header: ", |f| f.write([q("foo bar", false, 2)]));
        assert_eq!(out, "X-Header: foo bar\r\n");
    }

    #[test]
    fn test_word_long_plain_text_is_encoded_on_split() {
        let out = fold_with("X-Header: ", |f| f.write([q(&i(182), false, 2)]));
        assert_eq!(
            out,
            format!(
                "X-Header: =?utf-8?q?{}?=\r\n =?utf-8?q?{}?=\r\n =?utf-8?q?{}?=\r\n",
                i(56),
                i(63),
                i(63)
            )
        );
    }

    #[test]
    fn test_word_marker_preferred_over_split() {
        let out = fold_with("X-Header: ", |f| {
            f.write(tokens![i(37), 1, i(20), q("foo bar", true, 2)]);
        });
        assert_eq!(
            out,
            format!("X-Header: {}\r\n {}=?utf-8?q?foo_bar?=\r\n", i(37), i(20))
        );
    }

    #[test]
    fn test_word_budget_too_small() {
        let out = fold_with("X-Header: ", |f| f.write(tokens![i(62), q("foo bar", true, 2)]));
        assert_eq!(out, format!("X-Header: {}=?utf-8?q?foo_bar?=\r\n", i(62)));

        let out = fold_with("X-Header: ", |f| f.write(tokens![i(61), q("éoo", true, 2)]));
        assert_eq!(out, format!("X-Header: {}=?utf-8?q?=C3=A9oo?=\r\n", i(61)));
    }

    #[test]
    fn test_word_q_splits() {
        let out = fold_with("X-Header: ", |f| f.write(tokens![i(55), q("foo bar", true, 2)]));
        assert_eq!(
            out,
            format!("X-Header: {}=?utf-8?q?f?=\r\n =?utf-8?q?oo_bar?=\r\n", i(55))
        );

        let out = fold_with("X-Header: ", |f| f.write(tokens![i(50), q("éoo", true, 2)]));
        assert_eq!(
            out,
            format!("X-Header: {}=?utf-8?q?=C3=A9?=\r\n =?utf-8?q?oo?=\r\n", i(50))
        );
    }

    #[test]
    fn test_word_q_splits_many_times() {
        let text = "q".repeat(132);
        let out = fold_with("X-Header: ", |f| f.write(tokens![i(50), q(&text, true, 2)]));
        assert_eq!(
            out,
            format!(
                "X-Header: {}=?utf-8?q?qqqqqq?=\r\n =?utf-8?q?{}?=\r\n =?utf-8?q?{}?=\r\n",
                i(50),
                "q".repeat(63),
                "q".repeat(63)
            )
        );
    }

    #[test]
    fn test_word_b_splits() {
        let out = fold_with("X-Header: ", |f| f.write(tokens![i(59), b("foo bar", 2)]));
        assert_eq!(out, format!("X-Header: {}=?utf-8?b?Zm9vIGJhcg==?=\r\n", i(59)));

        let out = fold_with("X-Header: ", |f| f.write(tokens![i(52), b("foo bar", 2)]));
        assert_eq!(
            out,
            format!("X-Header: {}=?utf-8?b?Zm9v?=\r\n =?utf-8?b?IGJhcg==?=\r\n", i(52))
        );

        let out = fold_with("X-Header: ", |f| f.write(tokens![i(52), b("ffé", 2)]));
        assert_eq!(
            out,
            format!("X-Header: {}=?utf-8?b?ZmY=?=\r\n =?utf-8?b?w6k=?=\r\n", i(52))
        );
    }

    #[test]
    fn test_word_b_splits_many_times() {
        let text = "b".repeat(99);
        let out = fold_with("X-Header: ", |f| f.write(tokens![i(50), b(&text, 2)]));
        let full = "YmJi".repeat(15);
        assert_eq!(
            out,
            format!(
                "X-Header: {}=?utf-8?b?YmJi?=\r\n =?utf-8?b?{full}?=\r\n =?utf-8?b?{full}?=\r\n =?utf-8?b?YmJiYmJi?=\r\n",
                i(50)
            )
        );
    }

    fn disposition(build: impl FnOnce(&mut Folder<Vec<u8>>)) -> String {
        fold_with("Content-Disposition: ", build)
    }

    #[test]
    fn test_param_regular_values() {
        let out = disposition(|f| f.write(tokens!["attachment; ", MimeParam::new("filename", "", 1)]));
        assert_eq!(out, "Content-Disposition: attachment; filename=\r\n");

        let out = disposition(|f| {
            f.write(tokens!["attachment; ", MimeParam::new("filename", "foo bar.txt", 1)]);
        });
        assert_eq!(out, "Content-Disposition: attachment; filename=\"foo bar.txt\"\r\n");
    }

    #[test]
    fn test_param_budget_too_small() {
        let out = disposition(|f| {
            f.write(tokens![i(45), "; ", MimeParam::new("filename", "foobar.txt", 1)]);
        });
        assert_eq!(
            out,
            format!("Content-Disposition: {}; filename=foobar.txt\r\n", i(45))
        );
    }

    #[test]
    fn test_param_marker_before_split() {
        let s = "s".repeat(37);
        let out = disposition(|f| {
            f.write(["attachment;"]);
            f.write(Token::fws(1));
            f.write([MimeParam::new("filename", s.as_str(), 1)]);
        });
        assert_eq!(out, format!("Content-Disposition: attachment;\r\n filename={s}\r\n"));
    }

    #[test]
    fn test_param_continuations() {
        let out = disposition(|f| {
            f.write(["attachment;"]);
            f.write(Token::fws(1));
            f.write([MimeParam::new("filename", "s".repeat(69), 2)]);
        });
        assert_eq!(
            out,
            format!(
                "Content-Disposition: attachment;\r\n filename*0*=utf-8''{}\r\n filename*1*={}\r\n",
                "s".repeat(58),
                "s".repeat(11)
            )
        );
    }

    #[test]
    fn test_param_continuations_many_times() {
        let out = disposition(|f| {
            f.write(["attachment;"]);
            f.write(Token::fws(1));
            f.write([MimeParam::new("filename", "s".repeat(188), 1)]);
        });
        assert_eq!(
            out,
            format!(
                "Content-Disposition: attachment;\r\n filename*0*=utf-8''{}\r\n filename*1*={}\r\n filename*2*={}\r\n",
                "s".repeat(58),
                "s".repeat(65),
                "s".repeat(65)
            )
        );
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_is_sticky() {
        let mut folder = Folder::new(FailingSink);
        folder.write(tokens!["To:", 1, " ", i(100)]);
        assert!(folder.error().is_some());
        folder.write(["more"]);
        folder.close();
        assert!(!folder.is_closed());
        assert!(folder.finish().is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut folder = Folder::new(Vec::new());
        folder.write(["Subject: hi"]);
        folder.close();
        folder.close();
        folder.write(["ignored"]);
        assert!(folder.is_closed());
        assert_eq!(folder.get_ref().as_slice(), b"Subject: hi\r\n");
    }
}
