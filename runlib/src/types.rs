use uuid::Uuid;

pub type JobId = Uuid;
pub type OutputBlob = bytes::Bytes;

/// One compile-and-run request.
#[derive(Clone, Debug)]
pub struct Job {
    pub id: JobId,
    pub source_code: String,
    pub input: String,
}

impl Job {
    pub fn new(source_code: impl Into<String>, input: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), source_code, input)
    }

    pub fn with_id(id: JobId, source_code: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id,
            source_code: source_code.into(),
            input: input.into(),
        }
    }
}

/// Languages the pipeline knows how to build. Only one toolchain is wired up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Cpp,
}

impl Language {
    pub fn source_extension(self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
        }
    }
}
