pub(crate) use {
    std::{
        collections::{
            BTreeMap,
            BTreeSet,
        },
        path::{
            Path,
            PathBuf,
        },
        sync::Arc,
    },
    chrono::prelude::*,
    itertools::Itertools as _,
    serde::{
        Deserialize,
        Serialize,
    },
    crate::{
        config::Config,
        league::{
            PlayerId,
            Standings,
        },
    },
};
