//! Bounded-memory streaming over large documents
//!
//! The callback sees every element once its end tag has been read, with its
//! subtree complete. Afterwards the element is attached to its parent and the
//! root's finished children are dropped, so memory stays proportional to the
//! depth of the document rather than its size.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use quick_xml::Reader;
use tracing::{debug, error, instrument, trace};

use crate::error::Error;
use crate::xml::parser::{position, read_step, Step, TreeBuilder};
use crate::xml::{Config, Element};

/// Stream `reader`, calling `callback` on every completed element
///
/// An error returned by the callback stops the iteration and is passed
/// through unchanged.
pub fn for_each_streamed<R, F, E>(reader: R, callback: F) -> Result<(), E>
where
    R: Read,
    F: FnMut(&mut Element) -> Result<(), E>,
    E: From<Error>,
{
    for_each_streamed_with_config(reader, Config::default(), callback)
}

/// Open `path` and stream it; the file is closed on every exit path
#[instrument(skip(callback))]
pub fn for_each_streamed_path<F, E>(path: &Path, callback: F) -> Result<(), E>
where
    F: FnMut(&mut Element) -> Result<(), E>,
    E: From<Error>,
{
    let file = File::open(path).map_err(|err| {
        error!("failed to open file: {err}");
        Error::from(err)
    })?;
    for_each_streamed(file, callback)
}

pub fn for_each_streamed_with_config<R, F, E>(
    reader: R,
    config: Config,
    mut callback: F,
) -> Result<(), E>
where
    R: Read,
    F: FnMut(&mut Element) -> Result<(), E>,
    E: From<Error>,
{
    let mut reader = Reader::from_reader(BufReader::new(reader));
    let mut buf = Vec::new();
    let mut builder = TreeBuilder::new(config);
    let mut completed = 0usize;

    loop {
        let step = read_step(&mut reader, &mut buf)?;
        let offset = position(&reader);
        config.check_size(usize::try_from(offset).unwrap_or(usize::MAX))?;

        match step {
            Step::Open(element) => builder.open(element, offset)?,
            Step::Leaf(element) => {
                builder.open(element, offset)?;
                complete(&mut builder, &mut callback)?;
                completed += 1;
            }
            Step::Close => {
                complete(&mut builder, &mut callback)?;
                completed += 1;
            }
            Step::Text(text) => builder.text(&text, offset)?,
            Step::Skip => {}
            Step::Eof => {
                builder.finish(offset)?;
                break;
            }
        }
    }

    debug!(completed, "stream finished");
    Ok(())
}

fn complete<F, E>(builder: &mut TreeBuilder, callback: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Element) -> Result<(), E>,
{
    let Some(mut element) = builder.close() else {
        return Ok(());
    };
    trace!(tag = %element.tag, "element completed");
    callback(&mut element)?;
    builder.attach(element);
    builder.clear_root_children();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Result};

    const MARKUP: &str = "<a><b>1</b><c><d>2</d></c><b>3</b></a>";

    #[test]
    fn test_callback_order_is_end_order() -> Result<()> {
        let mut seen = Vec::new();
        for_each_streamed(MARKUP.as_bytes(), |element: &mut Element| -> Result<()> {
            seen.push(element.tag.clone());
            Ok(())
        })?;
        assert_eq!(seen, vec!["b", "d", "c", "b", "a"]);
        Ok(())
    }

    #[test]
    fn test_subtree_complete_and_root_cleared() -> Result<()> {
        let mut snapshots = Vec::new();
        for_each_streamed(MARKUP.as_bytes(), |element: &mut Element| -> Result<()> {
            snapshots.push((element.tag.clone(), element.children.len()));
            Ok(())
        })?;
        // `c` still holds `d`; the root has shed its finished children.
        assert!(snapshots.contains(&("c".to_string(), 1)));
        assert_eq!(snapshots.last(), Some(&("a".to_string(), 0)));
        Ok(())
    }

    #[test]
    fn test_root_text_excludes_top_level_tails() -> Result<()> {
        let markup = "<a x=\"1\">head<b>1</b>tail_b<c><d>2</d>tail_d</c>tail_c</a>";
        let mut root = None;
        let mut c = None;
        for_each_streamed(markup.as_bytes(), |element: &mut Element| -> Result<()> {
            match element.tag.as_str() {
                "a" => root = Some(element.clone()),
                "c" => c = Some(element.clone()),
                _ => {}
            }
            Ok(())
        })?;

        let root = root.unwrap_or_default();
        assert_eq!(root.text, "head");
        assert_eq!(root.attributes.get("x").map(String::as_str), Some("1"));
        assert!(root.children.is_empty());

        // Nested tails stay with their elements
        let c = c.unwrap_or_default();
        assert_eq!(c.children.first().map(|d| d.tail.as_str()), Some("tail_d"));
        assert_eq!(c.children.first().map(|d| d.text.as_str()), Some("2"));
        Ok(())
    }

    #[test]
    fn test_indented_input_keeps_subtree_text() -> Result<()> {
        let markup = "<root a=\"aaa\">\n  root text\n  <c>\n    c text\n    <d>ddd</d>d tail\n  </c>\n  c tail\n  <k>k1</k>\n</root>\n";
        let mut seen = Vec::new();
        for_each_streamed(markup.as_bytes(), |element: &mut Element| -> Result<()> {
            seen.push(element.clone());
            Ok(())
        })?;

        let tags: Vec<_> = seen.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["d", "c", "k", "root"]);

        let c = seen.get(1).cloned().unwrap_or_default();
        assert_eq!(c.text.trim(), "c text");
        assert_eq!(c.children.first().map(|d| d.tail.as_str()), Some("d tail\n  "));

        let root = seen.last().cloned().unwrap_or_default();
        assert_eq!(root.text.trim(), "root text");
        assert_eq!(root.text, "\n  root text\n  ");
        assert_eq!(root.attributes.get("a").map(String::as_str), Some("aaa"));
        Ok(())
    }

    #[test]
    fn test_callback_error_aborts() {
        let mut calls = 0;
        let result = for_each_streamed(MARKUP.as_bytes(), |_: &mut Element| -> Result<()> {
            calls += 1;
            Err(Error::malformed_record("stop"))
        });
        assert_eq!(calls, 1);
        assert_eq!(
            result.err().map(|e| e.kind().clone()),
            Some(ErrorKind::MalformedRecord)
        );
    }

    #[test]
    fn test_malformed_stream() {
        let result = for_each_streamed("<a><b></a>".as_bytes(), |_: &mut Element| -> Result<()> {
            Ok(())
        });
        assert!(result.is_err_and(|e| e.is_parse_failure()));

        let result = for_each_streamed("".as_bytes(), |_: &mut Element| -> Result<()> { Ok(()) });
        assert!(result.is_err());
    }

    #[test]
    fn test_size_limit() {
        let result = for_each_streamed_with_config(
            MARKUP.as_bytes(),
            Config::new(0, 8),
            |_: &mut Element| -> Result<()> { Ok(()) },
        );
        assert_eq!(
            result.err().map(|e| e.kind().clone()),
            Some(ErrorKind::MaxSizeExceeded { max: 8 })
        );
    }
}
