//! Factory surface mirroring the processor constructors.
//!
//! These free functions are the public entry points: they accept open
//! specs or already-built processors and return the composition as a
//! boxed [`RowProcessor`].

use ntup_model::Model;
use ntup_result::{Error, Result};

use crate::chain::ChainProcessor;
use crate::join::JoinProcessor;
use crate::processor::RowProcessor;
use crate::single::SingleProcessor;
use crate::spec::OpenSpec;

/// Processor over one tuple.
pub fn create(
    spec: OpenSpec,
    model: Option<Model>,
    name: Option<&str>,
) -> Result<Box<dyn RowProcessor>> {
    Ok(Box::new(SingleProcessor::new(spec, model, name)?))
}

/// Vertical concatenation of the tuples named by `specs`.
pub fn create_chain(
    specs: Vec<OpenSpec>,
    model: Option<Model>,
    name: Option<&str>,
) -> Result<Box<dyn RowProcessor>> {
    Ok(Box::new(ChainProcessor::from_specs(specs, model, name)?))
}

/// Vertical concatenation of existing processors.
pub fn create_chain_from(
    processors: Vec<Box<dyn RowProcessor>>,
    model: Option<Model>,
    name: Option<&str>,
) -> Result<Box<dyn RowProcessor>> {
    Ok(Box::new(ChainProcessor::from_processors(
        processors, model, name,
    )?))
}

/// Join of the tuples named by `specs`: the first is the primary, the rest
/// are auxiliaries matched on `join_fields` (empty for an aligned join).
///
/// When models are supplied there must be one per spec, in the same order.
pub fn create_join(
    specs: Vec<OpenSpec>,
    join_fields: Vec<String>,
    models: Option<Vec<Model>>,
    name: Option<&str>,
) -> Result<Box<dyn RowProcessor>> {
    if specs.is_empty() {
        return Err(Error::invalid_argument(
            "at least one tuple must be provided",
        ));
    }
    if let Some(models) = &models {
        if models.len() != specs.len() {
            return Err(Error::invalid_argument(
                "number of provided models must match number of specified tuples",
            ));
        }
    }

    let mut models: Vec<Option<Model>> = match models {
        Some(models) => models.into_iter().map(Some).collect(),
        None => vec![None; specs.len()],
    };

    let mut specs = specs.into_iter();
    let primary_spec = specs.next().ok_or_else(|| {
        Error::Internal("spec list emptied unexpectedly".to_string())
    })?;
    let primary = SingleProcessor::new(primary_spec, models[0].take(), None)?;

    let mut join = JoinProcessor::new(Box::new(primary), join_fields, None, name)?;
    for (idx, spec) in specs.enumerate() {
        let aux = SingleProcessor::new(spec, models[idx + 1].take(), None)?;
        join.add_auxiliary(Box::new(aux), None)?;
    }
    Ok(Box::new(join))
}

/// Join of existing processors.
///
/// When models are supplied there must be one per processor (primary
/// first); the primary's model overrides the join's base model and each
/// auxiliary's model restricts the fields grafted for it.
pub fn create_join_from(
    primary: Box<dyn RowProcessor>,
    auxiliaries: Vec<Box<dyn RowProcessor>>,
    join_fields: Vec<String>,
    models: Option<Vec<Model>>,
    name: Option<&str>,
) -> Result<Box<dyn RowProcessor>> {
    if let Some(models) = &models {
        if models.len() != auxiliaries.len() + 1 {
            return Err(Error::invalid_argument(
                "number of provided models must match number of processors",
            ));
        }
    }

    let mut models: Vec<Option<Model>> = match models {
        Some(models) => models.into_iter().map(Some).collect(),
        None => vec![None; auxiliaries.len() + 1],
    };

    let mut join = JoinProcessor::new(primary, join_fields, models[0].take(), name)?;
    for (idx, aux) in auxiliaries.into_iter().enumerate() {
        let model = models[idx + 1].take();
        join.add_auxiliary(aux, model.as_ref())?;
    }
    Ok(Box::new(join))
}
