//! Terminal rendering of the streamed transcript

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{self, Write};

use crate::session::{Role, SessionSnapshot, ToolCall, ToolCallStatus, Turn};

/// Human label for the tools the PMM agent exposes
pub fn tool_label(name: &str) -> Cow<'_, str> {
    let label = match name {
        "run_five_second_test" => "5-second test",
        "analyze_positioning" => "Positioning analysis",
        "analyze_messaging" => "Messaging analysis",
        "analyze_homepage_structure" => "Homepage structure review",
        "detect_anti_patterns" => "Anti-pattern scan",
        "generate_rewrite" => "Copy rewrite",
        "build_competitive_frame" => "Competitive frame",
        "analyze_icp" => "ICP analysis",
        "run_complete_pmm_audit" => "Full PMM audit",
        "fetch_homepage" => "Fetch homepage",
        "fetch_competitor_homepage" => "Fetch competitor homepage",
        "analyze_landing_page" => "Landing page analysis",
        "scrape_social_proof" => "Social proof scan",
        "create_positioning_canvas" => "Positioning canvas",
        "create_messaging_framework" => "Messaging framework",
        "create_homepage_wireframe" => "Homepage wireframe",
        "generate_differentiation_statements" => "Differentiation statements",
        "write_todos" => "Planning",
        "task" => "Specialist subagent",
        _ => return Cow::Borrowed(name),
    };
    Cow::Borrowed(label)
}

fn status_marker(status: ToolCallStatus) -> &'static str {
    match status {
        ToolCallStatus::Pending => "..",
        ToolCallStatus::Running => "->",
        ToolCallStatus::Completed => "ok",
        ToolCallStatus::Error => "!!",
    }
}

/// Streams the in-progress assistant turn to a writer
///
/// Text is printed incrementally while it grows. When an update replaces
/// earlier text the whole turn is printed again on a fresh line.
pub struct TranscriptRenderer<W: Write> {
    out: W,
    show_tool_args: bool,
    turn_id: Option<String>,
    printed: String,
    at_line_start: bool,
    announced: HashSet<String>,
}

impl<W: Write> TranscriptRenderer<W> {
    pub fn new(out: W, show_tool_args: bool) -> Self {
        Self {
            out,
            show_tool_args,
            turn_id: None,
            printed: String::new(),
            at_line_start: true,
            announced: HashSet::new(),
        }
    }

    /// Render whatever changed in the turn being streamed
    pub fn update(&mut self, snapshot: &SessionSnapshot) -> io::Result<()> {
        match snapshot.streaming_turn() {
            Some(turn) => self.render(turn),
            None => Ok(()),
        }
    }

    /// Close the turn: trailing newline and tool summary
    pub fn finish(&mut self, snapshot: &SessionSnapshot) -> io::Result<()> {
        if let Some(turn) = snapshot.turns.last().filter(|t| t.role == Role::Assistant) {
            self.render(turn)?;
            self.break_line()?;
            if !turn.tool_calls.is_empty() {
                let summary: Vec<String> = turn
                    .tool_calls
                    .iter()
                    .map(|c| format!("{} ({})", tool_label(&c.name), c.status))
                    .collect();
                writeln!(self.out, "Tools used: {}", summary.join(", "))?;
            }
            writeln!(self.out)?;
        }

        self.abandon();
        self.out.flush()
    }

    /// Stop tracking the current turn without printing a summary
    pub fn abandon(&mut self) {
        self.turn_id = None;
        self.printed.clear();
        self.announced.clear();
    }

    /// Print an error banner
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.break_line()?;
        writeln!(self.out, "Error: {}\n", message)?;
        self.out.flush()
    }

    /// Print a line of front-end chrome
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        self.break_line()?;
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    /// Print an input label and leave the cursor after it
    pub fn prompt(&mut self, label: &str) -> io::Result<()> {
        self.break_line()?;
        write!(self.out, "{}", label)?;
        // The echoed answer ends the line
        self.at_line_start = true;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, turn: &Turn) -> io::Result<()> {
        if self.turn_id.as_deref() != Some(turn.id.as_str()) {
            self.turn_id = Some(turn.id.clone());
            self.printed.clear();
            self.announced.clear();
        }

        for call in &turn.tool_calls {
            if self.announced.insert(call.id.clone()) {
                self.write_tool_line(call)?;
            }
        }

        self.write_text(&turn.content)?;
        self.out.flush()
    }

    fn write_text(&mut self, content: &str) -> io::Result<()> {
        match content.strip_prefix(self.printed.as_str()) {
            Some("") => return Ok(()),
            Some(rest) => write!(self.out, "{}", rest)?,
            None => {
                // Replaced rather than extended
                self.break_line()?;
                write!(self.out, "{}", content)?;
            }
        }
        self.printed.clear();
        self.printed.push_str(content);
        self.at_line_start = content.ends_with('\n');
        Ok(())
    }

    fn write_tool_line(&mut self, call: &ToolCall) -> io::Result<()> {
        self.break_line()?;
        let label = tool_label(&call.name);
        if self.show_tool_args {
            writeln!(self.out, "  [{}] {} {}", status_marker(call.status), label, call.args)?;
        } else {
            writeln!(self.out, "  [{}] {}", status_marker(call.status), label)?;
        }
        Ok(())
    }

    fn break_line(&mut self) -> io::Result<()> {
        if !self.at_line_start {
            writeln!(self.out)?;
            self.at_line_start = true;
        }
        Ok(())
    }
}
