//! Line preprocessing and the graph-type header.

use plyboard_core::{ParsingError, PlyResult};

/// Graph types a notation document can declare.
pub const GRAPH_TYPE_NAMES: [&str; 2] = ["GRID", "GENERIC"];

/// A trimmed, non-blank source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number in the original text.
    pub number: usize,
    /// Line contents without surrounding whitespace.
    pub text: &'a str,
}

/// Trim every line and drop blank ones, keeping original line numbers.
pub fn preprocess(text: &str) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| SourceLine {
            number: i + 1,
            text: line.trim(),
        })
        .filter(|line| !line.text.is_empty())
        .collect()
}

/// Declared graph type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// `GENERIC`
    Generic,
    /// `GRID WxH`
    Grid {
        /// Number of columns.
        width: usize,
        /// Number of rows.
        height: usize,
    },
}

fn dimensions_error(line: usize) -> ParsingError {
    ParsingError::new(
        "The GRID graph type requires two positive dimensions expressed in the format <WIDTH>x<HEIGHT> following the GRID specifier",
        line,
        "GRID ".len() + 1,
    )
    .with_example("GRID 10x8")
}

/// Parse the first line of a document.
pub fn parse_header(line: &SourceLine<'_>) -> PlyResult<Header> {
    let (kind, rest) = match line.text.split_once(char::is_whitespace) {
        Some((kind, rest)) => (kind, rest.trim()),
        None => (line.text, ""),
    };
    match kind {
        "GENERIC" => Ok(Header::Generic),
        "GRID" => {
            let dims: Vec<&str> = rest.split(['x', 'X', '×']).map(str::trim).collect();
            if dims.len() != 2 {
                return Err(dimensions_error(line.number).into());
            }
            let parse = |s: &str| s.parse::<usize>().ok().filter(|v| *v > 0);
            match (parse(dims[0]), parse(dims[1])) {
                (Some(width), Some(height)) => Ok(Header::Grid { width, height }),
                _ => Err(dimensions_error(line.number).into()),
            }
        }
        _ => Err(ParsingError::new(
            format!(
                "Unable to find graph type \"{}\", currently supported graph types are {}",
                line.text,
                GRAPH_TYPE_NAMES.join(", ")
            ),
            line.number,
            1,
        )
        .into()),
    }
}
