use crate::errors::RestoreError;
use crate::types::{Candidate, Candidates, Choice, FileStat, Likeness, RestoreCommand, Selection};
use colored::Colorize;
use regex::Regex;
use std::cmp::Reverse;
use std::io::{self, BufRead, Write};
use std::sync::LazyLock;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

static CHOICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([[:alpha:]]?)$").expect("invalid choice pattern"));

/// Decides how a listing line looks, given how its candidate compares with the live file.
pub trait Palette {
    fn paint(&self, line: String, likeness: Likeness) -> String;
}

/// Strikes through copies identical to the live file and highlights those of a different size.
pub struct Colours;

impl Palette for Colours {
    fn paint(&self, line: String, likeness: Likeness) -> String {
        match likeness {
            Likeness::Identical => line.strikethrough().to_string(),
            Likeness::Different => line.blue().to_string(),
            Likeness::SameSize | Likeness::Unknown => line,
        }
    }
}

pub struct Plain;

impl Palette for Plain {
    fn paint(&self, line: String, _likeness: Likeness) -> String {
        line
    }
}

/// Newest first. Copies we couldn't stat go to the bottom.
pub fn sort_candidates(candidates: &mut Candidates) {
    candidates.sort_by_key(|c| Reverse(c.mtime()));
}

pub fn likeness(original: Option<&FileStat>, candidate: &Candidate) -> Likeness {
    match (original, candidate.stat.as_ref()) {
        (Some(o), Some(c)) if o == c => Likeness::Identical,
        (Some(o), Some(c)) if o.size == c.size => Likeness::SameSize,
        (Some(_), Some(_)) => Likeness::Different,
        _ => Likeness::Unknown,
    }
}

/// There's no point asking the user to choose if every copy is the same as the live file.
pub fn check_worth_restoring(
    original: Option<&FileStat>,
    candidates: &Candidates,
) -> Result<(), RestoreError> {
    if original.is_some()
        && !candidates.is_empty()
        && candidates
            .iter()
            .all(|c| likeness(original, c) == Likeness::Identical)
    {
        Err(RestoreError::AllIdentical)
    } else {
        Ok(())
    }
}

pub fn print_options(
    out: &mut impl Write,
    original: Option<&FileStat>,
    candidates: &Candidates,
    palette: &impl Palette,
) -> io::Result<()> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    for (index, candidate) in candidates.iter().enumerate() {
        let line = palette.paint(
            basic_line(index, candidate, offset),
            likeness(original, candidate),
        );
        writeln!(out, "{}", line)?;
    }

    Ok(())
}

/// Prompts for, and reads, a choice. `None` means the input has run dry.
pub fn get_choice(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Option<String>> {
    write!(out, "choose file to promote [add 'd' for diff, 'k' to keep] > ")?;
    out.flush()?;

    let mut buffer = String::new();

    if input.read_line(&mut buffer)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }

    Ok(Some(buffer.trim().to_string()))
}

/// Parses `<index>[command]`. An empty string means the user doesn't want anything.
pub fn parse_choice(input: &str, candidate_count: usize) -> Result<Option<Selection>, RestoreError> {
    if input.is_empty() {
        return Ok(None);
    }

    let invalid = || RestoreError::InvalidSelection(input.to_string());
    let captures = CHOICE.captures(input).ok_or_else(invalid)?;

    let index = captures[1].parse::<usize>().map_err(|_| invalid())?;

    if index >= candidate_count {
        return Err(invalid());
    }

    let command = match captures[2].chars().next() {
        None => RestoreCommand::InPlace,
        Some('k') => RestoreCommand::WithBackup,
        Some('d') => RestoreCommand::DiffOnly,
        Some(c) => return Err(RestoreError::UnknownCommand(c)),
    };

    Ok(Some(Selection { index, command }))
}

/// Either takes the newest candidate, or lists them all and asks the user which they want.
pub fn choose(
    auto: bool,
    original: Option<&FileStat>,
    candidates: &Candidates,
    input: &mut impl BufRead,
    out: &mut impl Write,
    palette: &impl Palette,
) -> anyhow::Result<Choice> {
    check_worth_restoring(original, candidates)?;

    if auto {
        return Ok(Choice::Take(Selection {
            index: 0,
            command: RestoreCommand::InPlace,
        }));
    }

    print_options(out, original, candidates, palette)?;

    let choice = match get_choice(input, out)? {
        Some(user_input) => match parse_choice(&user_input, candidates.len())? {
            Some(selection) => Choice::Take(selection),
            None => Choice::Skip,
        },
        None => Choice::Quit,
    };

    Ok(choice)
}

fn basic_line(index: usize, candidate: &Candidate, offset: UtcOffset) -> String {
    let (mtime, size) = match candidate.stat {
        Some(stat) => (format_timestamp(stat.mtime, offset), stat.size.to_string()),
        None => ("unknown".to_string(), "unknown".to_string()),
    };

    format!(
        "{:>2} {:<20} {:<35} {}",
        index, candidate.snapname, mtime, size
    )
}

fn format_timestamp(timestamp: i64, offset: UtcOffset) -> String {
    let datetime =
        OffsetDateTime::from_unix_timestamp(timestamp).unwrap_or(OffsetDateTime::UNIX_EPOCH);

    datetime
        .to_offset(offset)
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
        ))
        .unwrap_or_else(|_| String::from("Invalid date"))
}
