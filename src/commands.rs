use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::RadError;

/// A positional argument appended to the request path.
#[derive(Clone, Debug, PartialEq)]
pub enum RemoteArg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for RemoteArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
            // Debug keeps the fractional part (`1.0`), which the server expects for reals.
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
        }
    }
}

impl From<&str> for RemoteArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for RemoteArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for RemoteArg {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for RemoteArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RemoteArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for RemoteArg {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for RemoteArg {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for RemoteArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for RemoteArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HttpVerb {
    Get,
    #[default]
    Post,
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

impl FromStr for HttpVerb {
    type Err = RadError;

    /// An unknown verb is a `Transport` error: no request can be sent with it.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            _ => Err(RadError::Transport {
                url: String::new(),
                reason: format!("wrong request type `{value}`; expected `get` or `post`"),
            }),
        }
    }
}

/// One remote method invocation.
///
/// `headers`, `query`, `body` and `timeout` are passed straight to the HTTP
/// layer; the client never inspects them.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    pub method: String,
    pub args: Vec<RemoteArg>,
    pub quote_method: bool,
    pub verb: HttpVerb,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
            quote_method: true,
            verb: HttpVerb::Post,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<RemoteArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<RemoteArg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Send the method name without the `%22` quoting.
    pub fn unquoted(mut self) -> Self {
        self.quote_method = false;
        self
    }

    pub fn verb(mut self, verb: HttpVerb) -> Self {
        self.verb = verb;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path segment appended to the server base URL: `%22Name%22/arg1/arg2`.
    pub fn function_path(&self) -> String {
        let mut path = if self.quote_method {
            format!("%22{}%22", self.method)
        } else {
            self.method.clone()
        };
        path.push('/');

        let rendered: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        path.push_str(&rendered.join("/"));
        path
    }
}

impl From<&str> for RequestSpec {
    fn from(method: &str) -> Self {
        Self::new(method)
    }
}

impl From<String> for RequestSpec {
    fn from(method: String) -> Self {
        Self::new(method)
    }
}
