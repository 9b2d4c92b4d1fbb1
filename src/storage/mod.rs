use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::language::Language;
use crate::models::Submission;

pub fn ensure_dirs(dirs: &[&Path]) -> std::io::Result<()> {
    for dir in dirs {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Downloaded sources, one directory per problem and author.
#[derive(Debug, Clone)]
pub struct SourceCache {
    root: PathBuf,
}

/// A cached source file and the name it is shown under in Moss reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    pub path: PathBuf,
    pub display_name: String,
}

impl SourceCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<problem>/<author>/<idx>_<author>_<problem>_<verdict>_<score><ext>`
    pub fn path_for(&self, index: usize, submission: &Submission, language: Language) -> PathBuf {
        let author = &submission.author.id;
        let file_name = format!(
            "{:02}_{}_{}_{}_{}{}",
            index,
            author,
            submission.problem,
            submission.verdict,
            submission.score_percent(),
            language.extension()
        );
        self.root
            .join(&submission.problem)
            .join(author)
            .join(file_name)
    }

    /// A present file is trusted as the run's source.
    pub fn read(&self, path: &Path) -> std::io::Result<Option<String>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn write(&self, path: &Path, source: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, source)
    }

    /// Every cached file of `problem` written for `language`, sorted by path.
    pub fn files_for(&self, problem: &str, language: Language) -> std::io::Result<Vec<CachedFile>> {
        let problem_dir = self.root.join(problem);
        if !problem_dir.is_dir() {
            return Ok(Vec::new());
        }

        let root_name = self
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "generated".to_string());

        let mut files = Vec::new();
        for author_dir in std::fs::read_dir(&problem_dir)? {
            let author_dir = author_dir?;
            if !author_dir.file_type()?.is_dir() {
                continue;
            }
            let author = author_dir.file_name().to_string_lossy().into_owned();
            for entry in std::fs::read_dir(author_dir.path())? {
                let entry = entry?;
                let file_name = entry.file_name().to_string_lossy().into_owned();
                if !file_name.ends_with(language.extension()) {
                    continue;
                }
                files.push(CachedFile {
                    path: entry.path(),
                    display_name: format!("{}/{}/{}/{}", root_name, problem, author, file_name)
                        .replace(' ', "_"),
                });
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

/// Write `contents` to `dir/name` only once it is complete.
pub fn persist_report(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf, ReportError> {
    let path = dir.join(name);
    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.persist(&path).map_err(|err| write_err(err.error))?;
    Ok(path)
}
