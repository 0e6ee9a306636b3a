/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use miette::{MietteError, SourceCode, SourceSpan, SpanContents};
use std::sync::Arc;

/// A span within a shared source string.
///
/// Cloning a `Loc` is cheap: the source is reference counted, so every token
/// and value of a parsed document points into the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    /// The byte range covered by this location
    pub span: SourceSpan,
    /// The complete source the span indexes into
    pub src: Arc<str>,
}

impl Loc {
    /// Create a new `Loc` covering `span` within `src`
    pub fn new(span: impl Into<SourceSpan>, src: Arc<str>) -> Self {
        Self {
            span: span.into(),
            src,
        }
    }

    /// Create a new `Loc` over the same source but covering a different `span`
    pub fn span(&self, span: impl Into<SourceSpan>) -> Self {
        Self {
            span: span.into(),
            src: Arc::clone(&self.src),
        }
    }

    /// Byte offset of the first byte covered by this `Loc`
    pub fn start(&self) -> usize {
        self.span.offset()
    }

    /// Byte offset one past the last byte covered by this `Loc`
    pub fn end(&self) -> usize {
        self.span.offset() + self.span.len()
    }

    /// The text covered by this `Loc`, if the span lies on character boundaries
    pub fn snippet(&self) -> Option<&str> {
        self.src.get(self.start()..self.end())
    }
}

impl From<&Loc> for SourceSpan {
    fn from(loc: &Loc) -> Self {
        loc.span
    }
}

impl SourceCode for Loc {
    fn read_span<'a>(
        &'a self,
        span: &SourceSpan,
        context_lines_before: usize,
        context_lines_after: usize,
    ) -> Result<Box<dyn SpanContents<'a> + 'a>, MietteError> {
        (*self.src).read_span(span, context_lines_before, context_lines_after)
    }
}
