//! Parsers for the `--annotate` and `--connect` arguments.

use std::str::FromStr;

use reader_core::AnnotationType;

/// `START..END:TYPE[:NOTE]`, char offsets into the input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationArg {
    pub start: usize,
    pub end: usize,
    pub kind: AnnotationType,
    pub note: Option<String>,
}

impl FromStr for AnnotationArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (range, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected START..END:TYPE[:NOTE], got `{s}`"))?;
        let (start, end) = parse_range(range)?;
        let (kind, note) = match rest.split_once(':') {
            Some((kind, note)) => (kind, Some(note.to_string())),
            None => (rest, None),
        };
        let kind = kind.trim().parse::<AnnotationType>().map_err(|e| e.to_string())?;
        Ok(Self {
            start,
            end,
            kind,
            note,
        })
    }
}

/// `START..END=>START..END`, from one passage to another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionArg {
    pub from: (usize, usize),
    pub to: (usize, usize),
}

impl FromStr for ConnectionArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once("=>")
            .ok_or_else(|| format!("expected START..END=>START..END, got `{s}`"))?;
        Ok(Self {
            from: parse_range(from)?,
            to: parse_range(to)?,
        })
    }
}

fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (start, end) = s
        .trim()
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got `{s}`"))?;
    let start = start
        .trim()
        .parse()
        .map_err(|_| format!("`{start}` is not a char offset"))?;
    let end = end
        .trim()
        .parse()
        .map_err(|_| format!("`{end}` is not a char offset"))?;
    if end <= start {
        return Err(format!("range {start}..{end} is empty"));
    }
    Ok((start, end))
}
