//! Interactive front-end: menu dispatcher and input readers.
//!
//! The REPL owns the engine lifecycle and lends nothing out. Engine errors
//! are fatal and bubble out of [`Repl::run`]; input that merely fails to
//! parse is re-prompted.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::IndexConfig;
use crate::storage::btree::{BPlusTree, TreeError};
use crate::storage::{KEY_MAX, Key};

const MENU: &str = "commands: c=create  o=open  i=insert  s=search  x=close  q=quit";

/// Menu loop over an injected reader and writer.
pub struct Repl<R, W> {
    input: R,
    output: W,
    config: IndexConfig,
    tree: Option<BPlusTree>,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    /// Create a REPL reading commands from `input` and prompting on
    /// `output`.
    #[must_use]
    pub const fn new(input: R, output: W, config: IndexConfig) -> Self {
        Self {
            input,
            output,
            config,
            tree: None,
        }
    }

    /// Drive the menu loop until `q` or end of input, then close any open
    /// index.
    pub fn run(mut self) -> Result<(), ReplError> {
        writeln!(self.output, "{MENU}")?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };

            match line.trim() {
                "" => {}
                "c" => self.create()?,
                "o" => self.open()?,
                "i" => self.insert()?,
                "s" => writeln!(self.output, "search is not implemented")?,
                "x" => self.close()?,
                "q" => break,
                other => {
                    writeln!(self.output, "unknown command: {other}")?;
                    writeln!(self.output, "{MENU}")?;
                }
            }
        }

        self.close()?;
        Ok(())
    }

    fn create(&mut self) -> Result<(), ReplError> {
        let path = self.prompt_filename()?;
        self.close()?;

        self.tree = Some(BPlusTree::create(&path)?);
        tracing::info!("created index {}", path.display());
        writeln!(self.output, "created {}", path.display())?;
        Ok(())
    }

    fn open(&mut self) -> Result<(), ReplError> {
        let path = self.prompt_filename()?;
        self.close()?;

        self.tree = Some(BPlusTree::open(&path)?);
        tracing::info!("opened index {}", path.display());
        writeln!(self.output, "opened {}", path.display())?;
        Ok(())
    }

    fn insert(&mut self) -> Result<(), ReplError> {
        if self.tree.is_none() {
            writeln!(self.output, "no index is open")?;
            return Ok(());
        }

        let Some(key) = self.prompt_key()? else {
            return Ok(());
        };

        if let Some(tree) = self.tree.as_mut() {
            tree.insert(key)?;
        }
        tracing::debug!("inserted key {key}");
        writeln!(self.output, "inserted {key}")?;
        Ok(())
    }

    /// Close the open index, if any. Closing with nothing open is a no-op.
    fn close(&mut self) -> Result<(), ReplError> {
        if let Some(tree) = self.tree.take() {
            tree.close()?;
            tracing::info!("closed index");
            writeln!(self.output, "closed")?;
        }
        Ok(())
    }

    fn prompt_filename(&mut self) -> Result<PathBuf, ReplError> {
        write!(self.output, "filename: ")?;
        self.output.flush()?;

        let Some(line) = self.read_line()? else {
            return Err(ReplError::InvalidArgument("filename"));
        };

        let name = line.trim();
        if name.is_empty() {
            return Err(ReplError::InvalidArgument("filename"));
        }

        Ok(self.config.data_directory.join(name))
    }

    /// Read a decimal key, re-prompting until one parses. `None` at end of
    /// input.
    fn prompt_key(&mut self) -> Result<Option<Key>, ReplError> {
        loop {
            write!(self.output, "key [0, {KEY_MAX}]: ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            match line.trim().parse::<Key>() {
                Ok(key) => return Ok(Some(key)),
                Err(_) => {
                    writeln!(self.output, "enter a decimal key in [0, {KEY_MAX}]")?;
                }
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, ReplError> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Errors that terminate the front-end.
#[derive(Debug)]
pub enum ReplError {
    /// A required input was absent.
    InvalidArgument(&'static str),
    /// Terminal I/O failure.
    Io(std::io::Error),
    /// Engine failure.
    Tree(TreeError),
}

impl std::fmt::Display for ReplError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(name) => write!(f, "missing required input: {name}"),
            Self::Io(e) => write!(f, "terminal i/o failed: {e}"),
            Self::Tree(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ReplError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::Io(e) => Some(e),
            Self::Tree(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ReplError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<TreeError> for ReplError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Walker;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn run_script(config: IndexConfig, script: &str) -> Result<String, ReplError> {
        let mut output = Vec::new();
        let repl = Repl::new(Cursor::new(script.to_string()), &mut output, config);
        let result = repl.run();
        result.map(|()| String::from_utf8_lossy(&output).into_owned())
    }

    fn test_config(dir: &std::path::Path) -> IndexConfig {
        IndexConfig {
            data_directory: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_scripted_create_and_insert() {
        let dir = tempdir().expect("create temp dir");

        let output = run_script(
            test_config(dir.path()),
            "c\nscript.idx\ni\n42\ni\n7\nq\n",
        )
        .expect("run");
        assert!(output.contains("inserted 42"));
        assert!(output.contains("inserted 7"));

        let mut walker = Walker::open(&dir.path().join("script.idx")).expect("walk");
        let (_, root) = walker.next_node().expect("walk").expect("root");
        assert_eq!(root.keys[..2], [7, 42]);
    }

    #[test]
    fn test_open_resumes_an_existing_index() {
        let dir = tempdir().expect("create temp dir");

        run_script(test_config(dir.path()), "c\nresume.idx\ni\n5\nq\n").expect("first run");
        run_script(test_config(dir.path()), "o\nresume.idx\ni\n9\nq\n").expect("second run");

        let mut walker = Walker::open(&dir.path().join("resume.idx")).expect("walk");
        let (_, root) = walker.next_node().expect("walk").expect("root");
        assert_eq!(root.keys[..2], [5, 9]);
    }

    #[test]
    fn test_unparsable_key_is_reprompted() {
        let dir = tempdir().expect("create temp dir");

        let output = run_script(
            test_config(dir.path()),
            "c\nreprompt.idx\ni\nzzz\n70000\n5\nq\n",
        )
        .expect("run");
        assert!(output.contains("enter a decimal key"));

        let mut walker = Walker::open(&dir.path().join("reprompt.idx")).expect("walk");
        let (_, root) = walker.next_node().expect("walk").expect("root");
        assert_eq!(root.used(), 1);
        assert_eq!(root.keys[0], 5);
    }

    #[test]
    fn test_insert_without_open_index() {
        let dir = tempdir().expect("create temp dir");

        let output = run_script(test_config(dir.path()), "i\nq\n").expect("run");
        assert!(output.contains("no index is open"));
    }

    #[test]
    fn test_search_is_reserved() {
        let dir = tempdir().expect("create temp dir");

        let output = run_script(test_config(dir.path()), "s\nq\n").expect("run");
        assert!(output.contains("search is not implemented"));
    }

    #[test]
    fn test_close_without_open_is_a_noop() {
        let dir = tempdir().expect("create temp dir");

        run_script(test_config(dir.path()), "x\nx\nq\n").expect("run");
    }

    #[test]
    fn test_end_of_input_quits_cleanly() {
        let dir = tempdir().expect("create temp dir");

        run_script(test_config(dir.path()), "").expect("run");
    }

    #[test]
    fn test_empty_filename_is_fatal() {
        let dir = tempdir().expect("create temp dir");

        let mut output = Vec::new();
        let repl = Repl::new(
            Cursor::new("c\n\n".to_string()),
            &mut output,
            test_config(dir.path()),
        );
        let result = repl.run();
        assert!(matches!(result, Err(ReplError::InvalidArgument("filename"))));
    }
}
