//! Console logging for hosts and tests.
//!
//! The reconciler only emits `tracing` events; nothing is printed unless a subscriber is
//! installed. [`init`] installs a formatting subscriber on stderr whose filter is read from
//! the `GLUON_LOG` environment variable, e.g. `GLUON_LOG=gluon=trace` to see every
//! renderer call.

use std::io::{self, Write};
use std::sync::Once;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "GLUON_LOG";

const LOG_PREFIX: &str = "[gluon]";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

static TRACING_INSTALLED: Once = Once::new();

/// Installs the console subscriber (idempotent).
///
/// Does nothing if another global subscriber was installed first.
pub fn init() {
    TRACING_INSTALLED.call_once(|| {
        let filter = filter_from(std::env::var(LOG_ENV).ok().as_deref());
        let console = fmt::layer()
            .event_format(PassFormatter)
            .with_writer(PrefixedWriter)
            .with_ansi(false)
            .with_filter(filter);

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("a global subscriber is already installed; keeping it");
        }
    });
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(DEFAULT_LOG_LEVEL.into()))
}

#[derive(Clone, Copy, Default)]
struct PrefixedWriter;

impl<'a> MakeWriter<'a> for PrefixedWriter {
    type Writer = PrefixedWriterInner<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        PrefixedWriterInner {
            inner: io::stderr(),
            wrote_prefix: false,
        }
    }
}

struct PrefixedWriterInner<W> {
    inner: W,
    wrote_prefix: bool,
}

impl<W: Write> Write for PrefixedWriterInner<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.wrote_prefix {
            self.inner.write_all(LOG_PREFIX.as_bytes())?;
            self.inner.write_all(b" ")?;
            self.wrote_prefix = true;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Prints `LEVEL target [span{fields}:...] message`, keeping the pass number and node
/// path of the enclosing spans on every line.
#[derive(Clone, Copy, Default)]
struct PassFormatter;

impl<S, N> FormatEvent<S, N> for PassFormatter
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        write!(writer, "{} {}: ", metadata.level(), metadata.target())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<fmt::FormattedFields<N>>()
                    && !fields.is_empty()
                {
                    write!(writer, "{{{fields}}}")?;
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::{PrefixedWriterInner, filter_from, init};
    use std::io::Write;

    #[test]
    fn prefix_is_written_once_per_event() {
        let mut writer = PrefixedWriterInner {
            inner: Vec::new(),
            wrote_prefix: false,
        };
        writer.write_all(b"first ").unwrap();
        writer.write_all(b"second").unwrap();
        assert_eq!(writer.inner, b"[gluon] first second");
    }

    #[test]
    fn invalid_directives_fall_back_to_info() {
        assert_eq!(filter_from(Some("gluon=verbose")).to_string(), "info");
        assert_eq!(filter_from(None).to_string(), "info");
        assert_eq!(filter_from(Some("gluon=trace")).to_string(), "gluon=trace");
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialised twice without panicking");
    }
}
