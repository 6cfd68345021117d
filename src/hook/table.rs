// Argument table: the single source of truth translating the raw
// positional shape of each operation into named context fields. Hook
// authors never index positional arguments themselves; they go through
// the context views, which resolve here. New kinds get one row.

use serde_json::Value;

use crate::hook::args::CallArg;
use crate::hook::kind::OperationKind;

/// Named context fields a positional argument can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Query,
    Update,
    Insert,
    Options,
    Pipeline,
    MapFn,
    ReduceFn,
}

/// One traversal step below a positional argument.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Index(usize),
    Key(&'static str),
}

/// The path resolves only while `args[slot][key]` is truthy.
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    pub slot: usize,
    pub key: &'static str,
}

/// Where a named field lives inside the positional argument list.
#[derive(Debug, Clone, Copy)]
pub struct ArgPath {
    pub slot: usize,
    pub steps: &'static [Step],
    pub guard: Option<Guard>,
}

impl ArgPath {
    const fn slot(slot: usize) -> Self {
        Self {
            slot,
            steps: &[],
            guard: None,
        }
    }

    const fn steps(slot: usize, steps: &'static [Step]) -> Self {
        Self {
            slot,
            steps,
            guard: None,
        }
    }

    const fn guarded(slot: usize, steps: &'static [Step], guard: Guard) -> Self {
        Self {
            slot,
            steps,
            guard: Some(guard),
        }
    }
}

/// Rows indexed by `OperationKind` discriminant.
static ARG_TABLE: [&[(Field, ArgPath)]; 9] = [
    // insert(docs, options, ..)
    &[
        (Field::Insert, ArgPath::slot(0)),
        (Field::Options, ArgPath::slot(1)),
    ],
    // find(query, options, ..)
    &[
        (Field::Query, ArgPath::slot(0)),
        (Field::Options, ArgPath::slot(1)),
    ],
    // findOne(query, options, ..)
    &[
        (Field::Query, ArgPath::slot(0)),
        (Field::Options, ArgPath::slot(1)),
    ],
    // remove(query, options, ..)
    &[
        (Field::Query, ArgPath::slot(0)),
        (Field::Options, ArgPath::slot(1)),
    ],
    // aggregate(pipeline, options, ..); query is the first stage's match,
    // when the stage has one
    &[
        (Field::Pipeline, ArgPath::slot(0)),
        (
            Field::Query,
            ArgPath::steps(0, &[Step::Index(0), Step::Key("match")]),
        ),
        (Field::Options, ArgPath::slot(1)),
    ],
    // mapReduce(map, reduce, options, ..); the options object carries the
    // query and both functions
    &[
        (Field::Options, ArgPath::slot(2)),
        (Field::Query, ArgPath::steps(2, &[Step::Key("query")])),
        (Field::MapFn, ArgPath::steps(2, &[Step::Key("map")])),
        (Field::ReduceFn, ArgPath::steps(2, &[Step::Key("reduce")])),
    ],
    // update(query, update, options, ..); upserts expose $setOnInsert as
    // the would-be insert document
    &[
        (Field::Query, ArgPath::slot(0)),
        (Field::Update, ArgPath::slot(1)),
        (Field::Options, ArgPath::slot(2)),
        (
            Field::Insert,
            ArgPath::guarded(
                1,
                &[Step::Key("$setOnInsert")],
                Guard {
                    slot: 2,
                    key: "upsert",
                },
            ),
        ),
    ],
    // findAndModify(query, sort, update, options, ..)
    &[
        (Field::Query, ArgPath::slot(0)),
        (Field::Update, ArgPath::slot(2)),
        (Field::Options, ArgPath::slot(3)),
        (
            Field::Insert,
            ArgPath::guarded(
                2,
                &[Step::Key("$setOnInsert")],
                Guard {
                    slot: 3,
                    key: "upsert",
                },
            ),
        ),
    ],
    // findAndRemove(query, sort, options, ..): no named views
    &[],
];

pub(crate) fn path_for(kind: OperationKind, field: Field) -> Option<&'static ArgPath> {
    ARG_TABLE[kind as usize]
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map(|(_, path)| path)
}

/// JSON truthiness: absent, null, false, 0 and "" are falsy.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn guard_passes(args: &[CallArg], guard: Option<Guard>) -> bool {
    match guard {
        None => true,
        Some(guard) => args
            .get(guard.slot)
            .and_then(CallArg::as_value)
            .and_then(|value| value.get(guard.key))
            .map(truthy)
            .unwrap_or(false),
    }
}

pub(crate) fn resolve<'a>(args: &'a [CallArg], path: &ArgPath) -> Option<&'a Value> {
    if !guard_passes(args, path.guard) {
        return None;
    }

    let mut value = args.get(path.slot)?.as_value()?;
    for step in path.steps {
        value = match step {
            Step::Index(index) => value.get(index)?,
            Step::Key(key) => value.get(key)?,
        };
    }
    Some(value)
}

pub(crate) fn resolve_mut<'a>(args: &'a mut [CallArg], path: &ArgPath) -> Option<&'a mut Value> {
    if !guard_passes(args, path.guard) {
        return None;
    }

    let mut value = args.get_mut(path.slot)?.as_value_mut()?;
    for step in path.steps {
        value = match step {
            Step::Index(index) => value.get_mut(index)?,
            Step::Key(key) => value.get_mut(key)?,
        };
    }
    Some(value)
}
