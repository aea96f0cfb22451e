use crate::{
    Error,
    annotate::{AnnotateError, KeySpec, pipeline},
    db::{
        Db, DbError,
        executor::LoadExecutor,
        primitives::{CaseExpr, FilterExpr, OrderDirection},
        query::LoadQuery,
        response::{Response, Row},
    },
    traits::EntityValue,
};
use std::marker::PhantomData;

///
/// AnnotatableQuery
///
/// Drop-in lazy query wrapper: every standard refinement returns
/// another `AnnotatableQuery`, so capability is never lost after
/// `annotate_property`/`sort`. Wraps an inner engine intent by
/// composition; the two extra operations run the pipeline eagerly and
/// re-wrap the reissued intent.
///

pub struct AnnotatableQuery<'a, E: EntityValue> {
    db: &'a Db,
    query: LoadQuery,
    debug: bool,
    _marker: PhantomData<E>,
}

impl<E: EntityValue> std::fmt::Debug for AnnotatableQuery<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotatableQuery")
            .field("query", &self.query)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl<'a, E: EntityValue> AnnotatableQuery<'a, E> {
    #[must_use]
    pub fn new(db: &'a Db) -> Self {
        Self::from_query(db, LoadQuery::new())
    }

    /// Wrap an existing engine intent.
    #[must_use]
    pub const fn from_query(db: &'a Db, query: LoadQuery) -> Self {
        Self {
            db,
            query,
            debug: false,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Intent inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn query(&self) -> &LoadQuery {
        &self.query
    }

    #[must_use]
    pub fn into_query(self) -> LoadQuery {
        self.query
    }

    fn map_query(mut self, map: impl FnOnce(LoadQuery) -> LoadQuery) -> Self {
        self.query = map(self.query);
        self
    }

    fn rewrap(self, query: LoadQuery) -> Self {
        Self {
            db: self.db,
            query,
            debug: self.debug,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Standard refinement (pure, lazy)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn filter(self, expr: FilterExpr) -> Self {
        self.map_query(|query| query.filter(expr))
    }

    #[must_use]
    pub fn exclude(self, expr: FilterExpr) -> Self {
        self.map_query(|query| query.exclude(expr))
    }

    /// Attach an engine-native annotation expression.
    #[must_use]
    pub fn annotate_expr(self, name: impl Into<String>, expr: CaseExpr) -> Self {
        self.map_query(|query| query.annotate(name, expr))
    }

    #[must_use]
    pub fn order_by(self, field: impl Into<String>) -> Self {
        self.map_query(|query| query.order_by(field))
    }

    #[must_use]
    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.map_query(|query| query.order_by_desc(field))
    }

    /// Bound the number of returned rows.
    #[must_use]
    pub fn limit(self, limit: u32) -> Self {
        self.map_query(|query| query.limit(limit))
    }

    /// Skip a number of rows in the ordered result stream.
    #[must_use]
    pub fn offset(self, offset: u32) -> Self {
        self.map_query(|query| query.offset(offset))
    }

    /// Enable verbose execution summaries; use sparingly.
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    // ------------------------------------------------------------------
    // Property operations (eager: one materialize round-trip each)
    // ------------------------------------------------------------------

    /// Annotate with a computed property under the default output name
    /// `<name>_property`. Callables and composites have no default name
    /// and must go through `annotate_property_as`.
    pub fn annotate_property(self, spec: impl Into<KeySpec<E>>) -> Result<Self, Error> {
        let spec = spec.into();

        let Some(name) = spec.default_output_name() else {
            return Err(AnnotateError::InvalidArgument {
                reason: "an explicit property name is required unless the key specification is a bare name".to_string(),
            }
            .into());
        };

        self.annotate_property_named(spec, name)
    }

    /// Annotate with a computed property under an explicit output name.
    pub fn annotate_property_as(
        self,
        spec: impl Into<KeySpec<E>>,
        name: impl Into<String>,
    ) -> Result<Self, Error> {
        self.annotate_property_named(spec.into(), name.into())
    }

    fn annotate_property_named(self, spec: KeySpec<E>, name: String) -> Result<Self, Error> {
        if spec.is_composite() {
            return Err(AnnotateError::InvalidArgument {
                reason: "composite key specifications only apply to sort".to_string(),
            }
            .into());
        }

        let query = pipeline::annotate(self.db, &self.query, &spec, &name, self.debug)?;

        Ok(self.rewrap(query))
    }

    /// Sort by a computed key, ascending. Works like a host-language
    /// stable sort; composite keys compare element by element.
    pub fn sort(self, key: impl Into<KeySpec<E>>) -> Result<Self, Error> {
        self.sorted(key.into(), OrderDirection::Asc)
    }

    /// Sort by a computed key, descending.
    pub fn sort_desc(self, key: impl Into<KeySpec<E>>) -> Result<Self, Error> {
        self.sorted(key.into(), OrderDirection::Desc)
    }

    fn sorted(self, key: KeySpec<E>, direction: OrderDirection) -> Result<Self, Error> {
        let query = pipeline::sort(self.db, &self.query, &key, direction, self.debug)?;

        Ok(self.rewrap(query))
    }

    // ------------------------------------------------------------------
    // Execution terminals
    // ------------------------------------------------------------------

    pub fn execute(&self) -> Result<Response<E>, Error> {
        let response = LoadExecutor::<E>::new(self.db)
            .debug(self.debug)
            .execute(&self.query)?;

        Ok(response)
    }

    /// Execute and return the number of matching rows.
    pub fn count(&self) -> Result<u32, Error> {
        Ok(self.execute()?.count())
    }

    /// Execute and return whether the result set is empty.
    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.execute()?.is_empty())
    }

    /// Execute and collect all entities in order.
    pub fn entities(&self) -> Result<Vec<E>, Error> {
        Ok(self.execute()?.entities())
    }

    /// Execute and require exactly one row.
    pub fn one(&self) -> Result<Row<E>, Error> {
        Ok(self.execute()?.one().map_err(DbError::from)?)
    }
}

///
/// Manager
///
/// Manager-equivalent factory: the default query entry point for a
/// mapped entity, handing out facades the way a standard manager hands
/// out querysets. Obtained explicitly from a `Db` handle
/// (`db.manager::<E>()`) rather than through ambient inheritance.
///

pub struct Manager<'a, E: EntityValue> {
    db: &'a Db,
    _marker: PhantomData<E>,
}

impl<'a, E: EntityValue> Manager<'a, E> {
    pub(crate) const fn new(db: &'a Db) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    /// A facade over all rows of the entity.
    #[must_use]
    pub fn all(&self) -> AnnotatableQuery<'a, E> {
        AnnotatableQuery::new(self.db)
    }

    #[must_use]
    pub fn filter(&self, expr: FilterExpr) -> AnnotatableQuery<'a, E> {
        self.all().filter(expr)
    }

    pub fn annotate_property(
        &self,
        spec: impl Into<KeySpec<E>>,
    ) -> Result<AnnotatableQuery<'a, E>, Error> {
        self.all().annotate_property(spec)
    }

    pub fn annotate_property_as(
        &self,
        spec: impl Into<KeySpec<E>>,
        name: impl Into<String>,
    ) -> Result<AnnotatableQuery<'a, E>, Error> {
        self.all().annotate_property_as(spec, name)
    }

    pub fn sort(&self, key: impl Into<KeySpec<E>>) -> Result<AnnotatableQuery<'a, E>, Error> {
        self.all().sort(key)
    }

    pub fn sort_desc(&self, key: impl Into<KeySpec<E>>) -> Result<AnnotatableQuery<'a, E>, Error> {
        self.all().sort_desc(key)
    }
}

impl Db {
    /// The annotation-capable query entry point for a mapped entity.
    #[must_use]
    pub const fn manager<E: EntityValue>(&self) -> Manager<'_, E> {
        Manager::new(self)
    }
}
