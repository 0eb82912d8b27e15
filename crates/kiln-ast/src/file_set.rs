//! Source file registry and offset → line/column mapping

/// 1-based line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A source file registered in a `FileSet`
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(path: String, source: String) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|&(_, c)| c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            path,
            source,
            line_starts,
        }
    }

    /// Position of a byte offset. Offsets past the end clamp to the last line.
    pub fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset.min(self.source.len()))
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        Position {
            line: line + 1,
            column: column + 1,
        }
    }
}

/// All source files seen during one build, indexed by file id.
///
/// File ids start at 1 so that a zeroed `Span` never points at a real file.
#[derive(Debug, Default)]
pub struct FileSet {
    files: Vec<SourceFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id.
    pub fn add_file(&mut self, path: impl Into<String>, source: String) -> usize {
        self.files.push(SourceFile::new(path.into(), source));
        self.files.len()
    }

    pub fn get(&self, file_id: usize) -> Option<&SourceFile> {
        file_id.checked_sub(1).and_then(|i| self.files.get(i))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
