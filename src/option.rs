use std::{fmt, sync::Arc};

use crate::{
    engine::Engine,
    identity::{DiskIdentityLoader, IdentityLoader},
    ocf::OcfSigner,
};

/// Construction option for an [`Authority`].
///
/// Options either configure the authority itself or are handed to the engine constructor
/// untouched, keeping their relative order.
///
/// [`Authority`]: crate::Authority
pub enum Opt<E: Engine> {
    Wrapper(WrapperOption<E>),
    Engine(E::Option),
}

impl<E: Engine> Opt<E> {
    /// Installs the signer used for OCF issuance requests.
    pub fn ocf_signer<S>(signer: Arc<S>) -> Self
    where
        S: OcfSigner<E::SignOption> + 'static,
    {
        Opt::Wrapper(WrapperOption::OcfSigner(signer))
    }

    /// Replaces the loader used to read the intermediate identity.
    pub fn identity_loader<L>(loader: Arc<L>) -> Self
    where
        L: IdentityLoader + 'static,
    {
        Opt::Wrapper(WrapperOption::IdentityLoader(loader))
    }

    pub fn engine(opt: E::Option) -> Self {
        Opt::Engine(opt)
    }
}

/// Sets an already initialized database on a new authority.
///
/// Intended for graceful reloads, where the database state must survive the old authority.
pub fn with_database<E: Engine>(db: E::Database) -> Opt<E> {
    Opt::Engine(E::database_option(db))
}

/// Option that configures the authority itself.
pub enum WrapperOption<E: Engine> {
    OcfSigner(Arc<dyn OcfSigner<E::SignOption>>),
    IdentityLoader(Arc<dyn IdentityLoader>),
}

impl<E: Engine> WrapperOption<E> {
    fn name(&self) -> &'static str {
        match self {
            WrapperOption::OcfSigner(_) => "ocf-signer",
            WrapperOption::IdentityLoader(_) => "identity-loader",
        }
    }
}

impl<E: Engine> fmt::Debug for WrapperOption<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Splits `opts` into wrapper and engine options, keeping their relative order.
pub(crate) fn partition<E: Engine>(
    opts: impl IntoIterator<Item = Opt<E>>,
) -> (Vec<WrapperOption<E>>, Vec<E::Option>) {
    let mut wrapper_opts = Vec::new();
    let mut engine_opts = Vec::new();

    for opt in opts {
        match opt {
            Opt::Wrapper(opt) => wrapper_opts.push(opt),
            Opt::Engine(opt) => engine_opts.push(opt),
        }
    }

    (wrapper_opts, engine_opts)
}

/// Authority fields set by wrapper options.
pub(crate) struct Settings<E: Engine> {
    pub(crate) ocf_signer: Option<Arc<dyn OcfSigner<E::SignOption>>>,
    pub(crate) identity_loader: Arc<dyn IdentityLoader>,
}

impl<E: Engine> Settings<E> {
    /// Applies `opts` in order; later options replace earlier ones of the same kind.
    pub(crate) fn from_options(opts: Vec<WrapperOption<E>>) -> Self {
        let mut settings = Settings {
            ocf_signer: None,
            identity_loader: Arc::new(DiskIdentityLoader),
        };

        for opt in opts {
            log::debug!("applying authority option: {}", opt.name());

            match opt {
                WrapperOption::OcfSigner(signer) => settings.ocf_signer = Some(signer),
                WrapperOption::IdentityLoader(loader) => settings.identity_loader = loader,
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{CountingLoader, RecordingOcfSigner, StubDatabase, StubEngine, StubOption};

    fn tags(opts: &[StubOption]) -> Vec<&'static str> {
        opts.iter()
            .map(|opt| match opt {
                StubOption::Tag(tag) => *tag,
                StubOption::Database(_) => "database",
                StubOption::CallLog(_) => "call_log",
                StubOption::FailConstruction => "fail",
                StubOption::FailCalls => "fail-calls",
            })
            .collect()
    }

    #[test]
    fn partition_keeps_relative_order() {
        let opts = vec![
            Opt::<StubEngine>::engine(StubOption::Tag("a")),
            Opt::ocf_signer(Arc::new(RecordingOcfSigner::default())),
            Opt::engine(StubOption::Tag("b")),
            Opt::identity_loader(Arc::new(CountingLoader::default())),
            with_database(StubDatabase("reloaded")),
            Opt::ocf_signer(Arc::new(RecordingOcfSigner::default())),
            Opt::engine(StubOption::Tag("c")),
        ];

        let (wrapper_opts, engine_opts) = partition(opts);

        let names = wrapper_opts.iter().map(WrapperOption::name).collect::<Vec<_>>();
        assert_eq!(names, ["ocf-signer", "identity-loader", "ocf-signer"]);
        assert_eq!(tags(&engine_opts), ["a", "b", "database", "c"]);
    }

    #[test]
    fn partition_single_family() {
        let (wrapper_opts, engine_opts) = partition(vec![
            Opt::<StubEngine>::engine(StubOption::Tag("x")),
            Opt::engine(StubOption::Tag("y")),
        ]);
        assert!(wrapper_opts.is_empty());
        assert_eq!(tags(&engine_opts), ["x", "y"]);

        let (wrapper_opts, engine_opts) = partition(vec![Opt::<StubEngine>::identity_loader(
            Arc::new(CountingLoader::default()),
        )]);
        assert_eq!(wrapper_opts.len(), 1);
        assert!(engine_opts.is_empty());

        let (wrapper_opts, engine_opts) = partition(Vec::<Opt<StubEngine>>::new());
        assert!(wrapper_opts.is_empty());
        assert!(engine_opts.is_empty());
    }

    #[test]
    fn later_wrapper_option_wins() {
        let first = Arc::new(CountingLoader::default());
        let second = Arc::new(CountingLoader::default());

        let settings = Settings::<StubEngine>::from_options(vec![
            WrapperOption::IdentityLoader(first.clone()),
            WrapperOption::IdentityLoader(second.clone()),
        ]);

        let expected: Arc<dyn IdentityLoader> = second;
        assert!(Arc::ptr_eq(&settings.identity_loader, &expected));
        assert!(settings.ocf_signer.is_none());
    }
}
