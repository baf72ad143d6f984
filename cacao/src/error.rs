use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("missing required handle: {0}")]
    InvalidPointer(&'static str),

    #[error("out of memory while allocating `{0}`")]
    OutOfMemory(String),

    #[error("{0}")]
    Failed(String),
}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidArgument(_) => Status::InvalidArgument,
            Error::InvalidPointer(_) => Status::InvalidPointer,
            Error::OutOfMemory(_) => Status::OutOfMemory,
            Error::Failed(_) => Status::Failed,
        }
    }
}

/// Flat status code, for hosts that report results across an API boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    InvalidArgument,
    InvalidPointer,
    OutOfMemory,
    Failed,
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Ok,
            Err(err) => err.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status() {
        assert_eq!(Status::Ok, Status::from(&Ok::<_, Error>(())));

        assert_eq!(
            Status::InvalidArgument,
            Status::from(&Err::<(), _>(Error::InvalidArgument("size".into())))
        );

        assert_eq!(
            Status::InvalidPointer,
            Error::InvalidPointer("normal input").status()
        );

        assert_eq!(
            Status::OutOfMemory,
            Error::OutOfMemory("cacao_output".into()).status()
        );

        assert_eq!(Status::Failed, Error::Failed("lost".into()).status());
    }
}
