// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error types for quantile sketch operations

use std::fmt;

/// The ways operations of this crate can fail.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An offline merge was attempted over summaries that were collected
    /// with different epsilon values. Both values are carried so callers
    /// can report which inputs disagree.
    EpsilonMismatch {
        /// Epsilon of the merge target accumulated so far.
        primary: f64,
        /// Epsilon of the input that failed to match.
        other: f64,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::EpsilonMismatch { primary, other } => write!(
                f,
                "summaries disagree on epsilon: primary collected at {primary}, other at {other}"
            ),
        }
    }
}

/// Error returned by the fallible operations of this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<anyhow::Error>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Attaches the underlying cause of this error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns which kind of failure occurred.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch() -> Error {
        Error::new(ErrorKind::EpsilonMismatch {
            primary: 0.1,
            other: 0.01,
        })
    }

    #[test]
    fn test_kind_carries_epsilons() {
        match mismatch().kind() {
            ErrorKind::EpsilonMismatch { primary, other } => {
                assert_eq!(primary, 0.1);
                assert_eq!(other, 0.01);
            }
        }
    }

    #[test]
    fn test_display_names_both_epsilons() {
        let rendered = format!("{}", mismatch());
        assert!(rendered.contains("epsilon"), "got {rendered}");
        assert!(rendered.contains("0.1"), "got {rendered}");
        assert!(rendered.contains("0.01"), "got {rendered}");
    }

    #[test]
    fn test_source_is_chained() {
        use std::error::Error as _;

        let plain = mismatch();
        assert!(plain.source().is_none());

        let chained = mismatch().with_source(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "truncated input",
        ));
        assert!(chained.source().is_some());
        assert!(format!("{chained}").contains("truncated input"));
    }
}
