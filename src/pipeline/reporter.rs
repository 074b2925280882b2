//! The reporting service.
//!
//! One `Reporter` is built at the host's composition root and shared by
//! reference. Each report call runs:
//! 1. Record assembly (data builder)
//! 2. Ignore decision (minimum level, error-code mask, host check)
//! 3. Serialization and scrubbing
//! 4. Truncation to the size ceiling
//! 5. Hand-off to the sender
//!
//! [`Reporter::log`] never fails toward the host: anything that goes wrong while
//! reporting is logged and turned into an unsent [`Response`].

use std::panic::{self, AssertUnwindSafe};

use crate::builder::{DataBuilder, ReportContext, ToLog};
use crate::config::ReporterConfig;
use crate::error::{ConfigError, ReportError};
use crate::logging::LogContext;
use crate::model::PsrLevel;
use crate::payload::{Payload, PayloadSerializer};
use crate::routing::IgnoreFilter;
use crate::truncation::{EncodedPayload, Truncation, TruncationStrategy};

use super::sender::{Response, Sender};

pub struct Reporter {
    access_token: String,
    builder: DataBuilder,
    filter: IgnoreFilter,
    serializer: PayloadSerializer,
    truncation: Truncation,
    sender: Box<dyn Sender>,
}

impl Reporter {
    /// Fails on an invalid configuration; nothing is half-built.
    pub fn new(config: &ReporterConfig, sender: Box<dyn Sender>) -> Result<Self, ConfigError> {
        let builder = DataBuilder::new(config)?;

        log::info!(
            "REPORTER_READY environment={} max_payload_size={} scrub_fields={}",
            config.environment,
            config.max_payload_size,
            config.scrub_fields.len()
        );

        Ok(Self {
            access_token: config.access_token.clone(),
            builder,
            filter: IgnoreFilter::from_config(config),
            serializer: PayloadSerializer::from_config(config)?,
            truncation: Truncation::from_config(config),
            sender,
        })
    }

    /// Adjust the data builder, e.g. to attach person or fingerprint callbacks.
    pub fn map_builder<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DataBuilder) -> DataBuilder,
    {
        self.builder = f(self.builder);
        self
    }

    pub fn with_filter(mut self, filter: IgnoreFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Add a truncation strategy ahead of the built-in ones.
    pub fn with_truncation_strategy(mut self, strategy: Box<dyn TruncationStrategy>) -> Self {
        self.truncation = self.truncation.with_strategy(strategy);
        self
    }

    pub fn builder(&self) -> &DataBuilder {
        &self.builder
    }

    /// Report `to_log` and send it.
    pub fn log(
        &self,
        level: Option<PsrLevel>,
        to_log: ToLog<'_>,
        context: &ReportContext,
    ) -> Response {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.prepare(level, to_log, context).map(|prepared| match prepared {
                Some(payload) => self.sender.send(&payload, &self.access_token),
                None => Response::ignored(),
            })
        }));

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log::error!(
                    "REPORT_FAILED kind={} error=\"exception while reporting {}: {}\"",
                    to_log.kind(),
                    to_log.describe(),
                    e
                );
                Response::failed(e.to_string())
            }
            Err(_) => {
                log::error!(
                    "REPORT_FAILED kind={} error=\"exception while reporting {}: panic\"",
                    to_log.kind(),
                    to_log.describe()
                );
                Response::failed("panic while reporting")
            }
        }
    }

    /// Build, filter, scrub and bound a payload without sending it.
    ///
    /// `Ok(None)` means the record was ignored.
    pub fn prepare(
        &self,
        level: Option<PsrLevel>,
        to_log: ToLog<'_>,
        context: &ReportContext,
    ) -> Result<Option<EncodedPayload>, ReportError> {
        let record = self.builder.make_data(level, to_log, context)?;
        let ctx = LogContext::new(&record.uuid).with_level(record.level);

        let decision = self.filter.should_ignore(&to_log, &record, &ctx);
        if decision.is_ignored() {
            crate::log_debug!(ctx, "REPORT_IGNORED", reason = decision.as_str());
            return Ok(None);
        }

        let payload = Payload::new(self.access_token.clone(), record);
        let encoded = self.serializer.serialize(&payload, &ctx)?;
        let encoded = self.truncation.truncate(encoded, &ctx)?;

        crate::log_info!(
            ctx,
            "REPORT_PREPARED",
            kind = to_log.kind(),
            size = encoded.size(),
        );
        Ok(Some(encoded))
    }

    /// Hand prepared payloads to the sender as one batch.
    pub fn flush_batch(&self, payloads: &[EncodedPayload]) -> Vec<Response> {
        if payloads.is_empty() {
            return Vec::new();
        }
        let responses = self.sender.send_batch(payloads, &self.access_token);
        log::info!(
            "BATCH_FLUSHED payloads={} succeeded={}",
            payloads.len(),
            responses.iter().filter(|r| r.is_success()).count()
        );
        responses
    }
}
