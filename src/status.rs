/// An HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        self.0
    }
}

/// The statuses this server ever answers with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// The case chain produced content.
    Ok,
    /// The request head or target could not be understood.
    BadRequest,
    /// Every dispatch failure, whatever its kind.
    NotFound,
    /// Anything but GET.
    NotImplemented,
}

impl Status {
    pub fn code(&self) -> StatusCode {
        StatusCode::from(self)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::NotImplemented => "Not Implemented",
        }
    }
}

#[rustfmt::skip]
impl From<&Status> for StatusCode {
    fn from(value: &Status) -> Self {
        match value {
            Status::Ok             => StatusCode(200),
            Status::BadRequest     => StatusCode(400),
            Status::NotFound       => StatusCode(404),
            Status::NotImplemented => StatusCode(501),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code().as_u16(), self.reason())
    }
}
