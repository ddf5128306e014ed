/*!
 * Markdown writer for codemerge artifacts
 */

use std::io::{self, Write};
use std::path::Path;

use crate::config::TraversalConfig;
use crate::types::Section;

/// Title line of every artifact
pub const TITLE: &str = "# Project Knowledge for AI Analysis";

/// Writes the artifact layout piece by piece onto any sink
pub struct MarkdownWriter<W: Write> {
    out: W,
}

impl<W: Write> MarkdownWriter<W> {
    /// Create a new Markdown writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write the fixed preamble and the configuration echo
    pub fn write_header(&mut self, config: &TraversalConfig) -> io::Result<()> {
        writeln!(self.out, "{}\n", TITLE)?;
        write!(
            self.out,
            "This markdown file contains the structure and contents of a project. \
             It is organized as follows:\n\n\
             1. Project folder structure\n\
             2. Contents of relevant files\n\n"
        )?;
        writeln!(self.out, "---\n")?;
        writeln!(self.out, "## Project Configuration\n")?;
        writeln!(self.out, "- Max directory depth: {}", config.max_depth)?;
        writeln!(self.out, "- Max file size: {}KB", config.max_file_size_kb)?;
        writeln!(
            self.out,
            "- File patterns included: {}\n",
            config.include_patterns.join(", ")
        )?;
        writeln!(self.out, "---\n")?;
        Ok(())
    }

    /// Write the folder structure block
    pub fn write_tree(&mut self, lines: &[String]) -> io::Result<()> {
        writeln!(self.out, "## Project Folder Structure\n")?;
        write!(self.out, "{}", lines.join("\n"))?;
        Ok(())
    }

    /// Write the heading that opens the content sections
    pub fn write_contents_header(&mut self) -> io::Result<()> {
        write!(self.out, "\n\n## File Contents\n")
    }

    /// Write one labeled section
    pub fn write_section(&mut self, label: &Path, section: &Section) -> io::Result<()> {
        write!(self.out, "\n\n## File: {}\n\n", label.display())?;
        match section {
            Section::Content { language_tag, body } => {
                write!(self.out, "```{}\n{}\n```\n", language_tag, body)
            }
            Section::TooLarge { size_kb, limit_kb } => writeln!(
                self.out,
                "File exceeds size limit ({:.2}KB > {}KB). Content not included.",
                size_kb, limit_kb
            ),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
