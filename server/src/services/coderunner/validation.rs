use protobuf::{CompileRequest, Language as WireLanguage};
use runlib::types::Language;
use thiserror::Error;

/// A request that passed validation and can be handed to the pipeline.
#[derive(Debug, PartialEq, Eq)]
pub struct Submission {
    pub code: String,
    pub input: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`language` is required")]
    MissingLanguage,
    #[error("`language` {0} is not a known language")]
    UnknownLanguage(i32),
    #[error("`language` {0:?} is not supported by this server")]
    UnsupportedLanguage(Language),
}

pub fn validate(request: CompileRequest, supported: Language) -> Result<Submission, ValidationError> {
    let CompileRequest {
        code,
        language,
        input,
    } = request;
    let language = match WireLanguage::from_i32(language) {
        Some(WireLanguage::Cpp) => Language::Cpp,
        Some(WireLanguage::Unspecified) => return Err(ValidationError::MissingLanguage),
        None => return Err(ValidationError::UnknownLanguage(language)),
    };
    if language != supported {
        return Err(ValidationError::UnsupportedLanguage(language));
    }
    Ok(Submission {
        code,
        input,
    })
}
