//! Construction and realisation of configuration.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use crate::{
    config::ConfigError,
    filters::LogFilter,
    formatter::SharedFormatter,
    handlers::{FormatterId, HandlerBuilder},
    logger::{HandlerBinding, Logger, ROOT_LOGGER},
    pipeline::Pipeline,
};

use super::types::{ConfigBuilder, LoggerConfigBuilder};

impl ConfigBuilder {
    /// Validate the configuration and realise it into a [`Pipeline`].
    pub fn build(&self) -> Result<Pipeline, ConfigError> {
        if self.version() != 1 {
            return Err(ConfigError::UnsupportedVersion(self.version()));
        }
        let Some(root_cfg) = self.root_logger() else {
            return Err(ConfigError::MissingRootLogger);
        };
        self.validate_logger_names()?;

        let formatters: BTreeMap<String, SharedFormatter> = self
            .formatter_builders()
            .iter()
            .map(|(id, b)| (id.clone(), b.build()))
            .collect();
        let built_filters = Self::build_map(
            self.filter_builders(),
            |b| b.build(),
            |id, source| ConfigError::FilterBuild { id, source },
        )?;
        let built_handlers = self.build_handlers(&formatters, &built_filters)?;

        let root = self.realise_logger(ROOT_LOGGER, root_cfg, &built_handlers, &built_filters)?;
        let mut pipeline = Pipeline::new(root).with_report_errors(self.report_errors);
        for (name, cfg) in self.logger_builders() {
            let logger = self.realise_logger(name, cfg, &built_handlers, &built_filters)?;
            pipeline = pipeline.with_logger(logger);
        }
        Ok(pipeline)
    }

    fn validate_logger_names(&self) -> Result<(), ConfigError> {
        for name in self.logger_builders().keys() {
            if name.is_empty() || name.split('.').any(str::is_empty) {
                return Err(ConfigError::InvalidLoggerName(name.clone()));
            }
        }
        Ok(())
    }

    fn build_map<B, O, E, F, G>(
        items: &BTreeMap<String, B>,
        mut build: F,
        wrap_err: G,
    ) -> Result<BTreeMap<String, O>, ConfigError>
    where
        F: FnMut(&B) -> Result<O, E>,
        G: Fn(String, E) -> ConfigError,
    {
        let mut built = BTreeMap::new();
        for (id, builder) in items {
            let obj = build(builder).map_err(|e| wrap_err(id.clone(), e))?;
            built.insert(id.clone(), obj);
        }
        Ok(built)
    }

    fn resolve_formatter(
        handler_id: &str,
        builder: &HandlerBuilder,
        formatters: &BTreeMap<String, SharedFormatter>,
    ) -> Result<SharedFormatter, ConfigError> {
        match builder.common().formatter_id() {
            None | Some(FormatterId::Default) => Ok(SharedFormatter::default()),
            Some(FormatterId::Custom(id)) => formatters.get(id).cloned().ok_or_else(|| {
                ConfigError::UnknownFormatterId {
                    handler: handler_id.to_owned(),
                    formatter: id.clone(),
                }
            }),
        }
    }

    fn build_handlers(
        &self,
        formatters: &BTreeMap<String, SharedFormatter>,
        filters: &BTreeMap<String, Arc<dyn LogFilter>>,
    ) -> Result<BTreeMap<String, HandlerBinding>, ConfigError> {
        let mut built = BTreeMap::new();
        for (id, builder) in self.handler_builders() {
            let formatter = Self::resolve_formatter(id, builder, formatters)?;
            let binding_filters = Self::collect_items(
                builder.common().filter_ids(),
                filters,
                Self::duplicate_filter_ids,
            )?;
            let handler = builder
                .build(formatter)
                .map_err(|source| ConfigError::HandlerBuild {
                    id: id.clone(),
                    source,
                })?;
            let mut template = HandlerBinding::new(id.clone(), handler);
            if let Some(level) = builder.common().level() {
                template = template.with_level(level);
            }
            for filter in binding_filters {
                template = template.with_filter(filter);
            }
            built.insert(id.clone(), template);
        }
        Ok(built)
    }

    fn collect_items<T: Clone>(
        ids: &[String],
        pool: &BTreeMap<String, T>,
        dup_err: impl FnOnce(Vec<String>) -> ConfigError,
    ) -> Result<Vec<T>, ConfigError> {
        let mut seen = HashSet::new();
        let mut dup = Vec::new();
        let mut missing = Vec::new();
        let mut items = Vec::new();

        for id in ids {
            if !seen.insert(id.clone()) {
                dup.push(id.clone());
                continue;
            }
            match pool.get(id) {
                Some(item) => items.push(item.clone()),
                None => missing.push(id.clone()),
            }
        }

        if !dup.is_empty() {
            return Err(dup_err(dup));
        }
        if !missing.is_empty() {
            return Err(ConfigError::UnknownIds(missing));
        }
        Ok(items)
    }

    fn duplicate_handler_ids(ids: Vec<String>) -> ConfigError {
        ConfigError::DuplicateHandlerIds(ids)
    }

    fn duplicate_filter_ids(ids: Vec<String>) -> ConfigError {
        ConfigError::DuplicateFilterIds(ids)
    }

    fn realise_logger(
        &self,
        name: &str,
        cfg: &LoggerConfigBuilder,
        handlers: &BTreeMap<String, HandlerBinding>,
        filters: &BTreeMap<String, Arc<dyn LogFilter>>,
    ) -> Result<Logger, ConfigError> {
        let bindings =
            Self::collect_items(cfg.handler_ids(), handlers, Self::duplicate_handler_ids)?;
        let logger_filters =
            Self::collect_items(cfg.filter_ids(), filters, Self::duplicate_filter_ids)?;

        let mut logger = Logger::new(name);
        if let Some(level) = cfg.level_opt().or(self.default_level()) {
            logger = logger.with_level(level);
        }
        if let Some(propagate) = cfg.propagate_opt() {
            logger = logger.with_propagate(propagate);
        }
        for filter in logger_filters {
            logger = logger.with_filter(filter);
        }
        for binding in bindings {
            logger = logger.with_handler(binding);
        }
        Ok(logger)
    }
}
