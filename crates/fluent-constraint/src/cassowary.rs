//! Cassowary constraint solver implementation.
//!
//! This is an implementation of the Cassowary linear constraint solving algorithm,
//! as described in "The Cassowary Linear Arithmetic Constraint Solving Algorithm"
//! by Greg J. Badros and Alan Borning.
//!
//! The algorithm uses a variation of the simplex method optimized for incremental
//! constraint solving with priorities (strengths). Every call to
//! [`Solver::add_constraint`] leaves the tableau optimal, so reading values
//! after [`Solver::update_variables`] is all a "solve" needs.
//!
//! The tableau is kept in ordered maps so pivot choices, and therefore the
//! chosen solution among equally good ones, are the same on every run.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use fluent_core::Relation;
use indexmap::IndexMap;
use smallvec::SmallVec;
use thiserror::Error;

/// Tolerance for floating-point comparisons.
const EPSILON: f64 = 1e-8;

/// Near-zero check for floating point values.
fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Unique identifier for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// Create a new variable with the given ID.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn id(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A variable scaled by a coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub variable: Variable,
    pub coefficient: f64,
}

/// A linear expression in the form: constant + Σ(coefficient * variable)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub terms: SmallVec<[Term; 4]>,
    pub constant: f64,
}

impl Expression {
    /// Create a constant expression.
    pub fn from_constant(value: f64) -> Self {
        Self {
            terms: SmallVec::new(),
            constant: value,
        }
    }

    /// Create an expression from a single variable.
    pub fn from_variable(var: Variable) -> Self {
        let mut expr = Self::default();
        expr.add_term(var, 1.0);
        expr
    }

    /// Add a term to the expression. Repeated variables are merged.
    pub fn add_term(&mut self, variable: Variable, coefficient: f64) {
        match self.terms.iter_mut().find(|t| t.variable == variable) {
            Some(term) => term.coefficient += coefficient,
            None => self.terms.push(Term { variable, coefficient }),
        }
        self.terms.retain(|t| !near_zero(t.coefficient));
    }

    /// Add another expression scaled by `multiplier`.
    pub fn add_expression(&mut self, other: &Expression, multiplier: f64) {
        self.constant += other.constant * multiplier;
        for term in &other.terms {
            self.add_term(term.variable, term.coefficient * multiplier);
        }
    }

    /// Multiply the expression by a scalar.
    pub fn multiply(&mut self, scalar: f64) {
        self.constant *= scalar;
        for term in &mut self.terms {
            term.coefficient *= scalar;
        }
        self.terms.retain(|t| !near_zero(t.coefficient));
    }

    /// Get the coefficient for a variable.
    pub fn coefficient(&self, variable: Variable) -> f64 {
        self.terms
            .iter()
            .find(|t| t.variable == variable)
            .map_or(0.0, |t| t.coefficient)
    }

    /// Variables referenced by this expression.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.terms.iter().map(|t| t.variable)
    }

    /// Evaluate with the given variable values.
    pub fn evaluate(&self, mut value_of: impl FnMut(Variable) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, t| acc + t.coefficient * value_of(t.variable))
    }
}

impl From<Variable> for Expression {
    fn from(var: Variable) -> Self {
        Self::from_variable(var)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::from_constant(value)
    }
}

impl Add for Expression {
    type Output = Expression;

    fn add(mut self, rhs: Expression) -> Expression {
        self.add_expression(&rhs, 1.0);
        self
    }
}

impl Add<f64> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: f64) -> Expression {
        self.constant += rhs;
        self
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(mut self, rhs: Expression) -> Expression {
        self.add_expression(&rhs, -1.0);
        self
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(mut self, rhs: f64) -> Expression {
        self.multiply(rhs);
        self
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self * -1.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            let c = term.coefficient;
            match (i, c < 0.0) {
                (0, false) => {}
                (0, true) => f.write_str("-")?,
                (_, false) => f.write_str(" + ")?,
                (_, true) => f.write_str(" - ")?,
            }
            if (c.abs() - 1.0).abs() < EPSILON {
                write!(f, "{}", term.variable)?;
            } else {
                write!(f, "{}*{}", c.abs(), term.variable)?;
            }
        }
        if self.terms.is_empty() {
            write!(f, "{}", self.constant)
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}

/// Constraint strength levels.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strength(pub f64);

impl Strength {
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Create a custom strength.
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, Self::REQUIRED.0))
    }

    /// Check if this is a required constraint.
    pub fn is_required(&self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

/// A constraint to be added to the solver: `expression REL 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub expression: Expression,
    pub relation: Relation,
    pub strength: Strength,
}

impl Constraint {
    /// Create a new constraint.
    pub fn new(expression: Expression, relation: Relation, strength: Strength) -> Self {
        Self {
            expression,
            relation,
            strength,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} 0 [{}]", self.expression, self.relation, self.strength.0)
    }
}

/// Handle for a constraint added to a [`Solver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(usize);

/// Symbol kinds used internally in the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum SymbolKind {
    /// An external variable (the actual unknowns we're solving for)
    External,
    /// A slack variable (for inequality constraints)
    Slack,
    /// An error variable (for non-required constraints)
    Error,
    /// A dummy variable (for required equality constraints)
    Dummy,
}

/// A tableau column. Ordered by creation so pivoting is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Symbol {
    id: usize,
    kind: SymbolKind,
}

impl Symbol {
    fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }

    fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    fn is_pivotable(&self) -> bool {
        matches!(self.kind, SymbolKind::Slack | SymbolKind::Error)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            SymbolKind::External => 'x',
            SymbolKind::Slack => 's',
            SymbolKind::Error => 'e',
            SymbolKind::Dummy => 'd',
        };
        write!(f, "{}{}", prefix, self.id)
    }
}

/// A row in the simplex tableau.
#[derive(Debug, Clone, Default)]
struct Row {
    constant: f64,
    cells: BTreeMap<Symbol, f64>,
}

impl Row {
    fn new(constant: f64) -> Self {
        Self {
            constant,
            cells: BTreeMap::new(),
        }
    }

    /// Add `coefficient * symbol`, dropping the cell if it cancels out.
    fn insert(&mut self, symbol: Symbol, coefficient: f64) {
        let entry = self.cells.entry(symbol).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.cells.remove(&symbol);
        }
    }

    /// Add `coefficient * row`.
    fn insert_row(&mut self, row: &Row, coefficient: f64) {
        self.constant += row.constant * coefficient;
        for (&s, &c) in &row.cells {
            self.insert(s, c * coefficient);
        }
    }

    fn remove(&mut self, symbol: Symbol) {
        self.cells.remove(&symbol);
    }

    fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for c in self.cells.values_mut() {
            *c = -*c;
        }
    }

    fn coefficient(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    /// Substitute a symbol in this row with another row.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        if let Some(coeff) = self.cells.remove(&symbol) {
            self.insert_row(row, coeff);
        }
    }

    /// Solve for a symbol in this row.
    ///
    /// Given `0 = constant + a*symbol + ...`, rewrite the row as
    /// `symbol = -constant/a - .../a`.
    fn solve_for(&mut self, symbol: Symbol) {
        let coeff = self.cells.remove(&symbol).unwrap_or(1.0);
        let multiplier = -1.0 / coeff;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
    }

    /// Solve for `rhs` in a row currently expressing `lhs`.
    fn solve_for_symbols(&mut self, lhs: Symbol, rhs: Symbol) {
        self.insert(lhs, -1.0);
        self.solve_for(rhs);
    }

    fn all_dummies(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    /// First non-dummy symbol with a negative coefficient.
    fn entering_symbol(&self) -> Option<Symbol> {
        self.cells
            .iter()
            .find(|(s, c)| !s.is_dummy() && **c < 0.0)
            .map(|(&s, _)| s)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constant)?;
        for (symbol, &c) in &self.cells {
            if c < 0.0 {
                write!(f, " - {}*{}", -c, symbol)?;
            } else {
                write!(f, " + {}*{}", c, symbol)?;
            }
        }
        Ok(())
    }
}

/// Bookkeeping for a constraint in the tableau.
#[derive(Debug, Clone, Copy)]
struct Tag {
    marker: Symbol,
    other: Option<Symbol>,
}

/// Which objective [`Solver::optimize`] should minimize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Objective {
    Main,
    Artificial,
}

/// Errors that can occur during constraint solving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// A required constraint could not be satisfied.
    #[error("The constraint cannot be satisfied")]
    UnsatisfiableConstraint,

    /// The objective could be decreased without bound.
    #[error("The objective is unbounded")]
    Unbounded,

    /// An internal error occurred.
    #[error("Internal solver error: {0}")]
    InternalError(&'static str),
}

/// The Cassowary constraint solver.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    /// Counter for generating unique symbol IDs
    symbol_counter: usize,
    /// Counter for constraint IDs
    constraint_counter: usize,
    /// The objective function row
    objective: Row,
    /// Artificial objective for phase 1
    artificial: Option<Row>,
    /// The tableau rows, keyed by their basic symbol
    rows: BTreeMap<Symbol, Row>,
    /// Mapping from variables to their external symbols
    var_symbols: IndexMap<Variable, Symbol>,
    /// Markers for every constraint in the tableau
    constraints: IndexMap<ConstraintId, Tag>,
    /// Variable values as of the last `update_variables`
    values: IndexMap<Variable, f64>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constraints currently in the solver (stays included).
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the solver has seen this variable in any constraint.
    pub fn has_variable(&self, var: Variable) -> bool {
        self.var_symbols.contains_key(&var)
    }

    /// Variables the solver knows about, in first-seen order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.var_symbols.keys().copied()
    }

    /// Value of a variable as of the last [`Solver::update_variables`].
    pub fn value(&self, var: Variable) -> Option<f64> {
        self.values.get(&var).copied()
    }

    /// All values as of the last [`Solver::update_variables`].
    pub fn values(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.values.iter().map(|(&v, &x)| (v, x))
    }

    /// Add a constraint to the solver.
    ///
    /// On any error the solver is left exactly as it was before the call.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, SolverError> {
        let checkpoint = self.clone();
        match self.try_add_constraint(constraint) {
            Ok(id) => Ok(id),
            Err(err) => {
                *self = checkpoint;
                Err(err)
            }
        }
    }

    fn try_add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, SolverError> {
        let (mut row, tag) = self.create_row(&constraint);

        let subject = match self.choose_subject(&row, &tag) {
            Some(subject) => Some(subject),
            None if row.all_dummies() => {
                // The row contains only dummy symbols - check for conflicts
                if !near_zero(row.constant) {
                    return Err(SolverError::UnsatisfiableConstraint);
                }
                // The constraint is redundant
                Some(tag.marker)
            }
            None => None,
        };

        match subject {
            Some(subject) => {
                row.solve_for(subject);
                self.substitute(subject, &row);
                self.rows.insert(subject, row);
            }
            None => {
                if !self.add_with_artificial_variable(row)? {
                    return Err(SolverError::UnsatisfiableConstraint);
                }
            }
        }

        let id = ConstraintId(self.constraint_counter);
        self.constraint_counter += 1;
        self.constraints.insert(id, tag);

        self.optimize(Objective::Main)?;
        Ok(id)
    }

    /// Prefer keeping `var` at `value` (a "stay").
    pub fn add_stay(
        &mut self,
        var: Variable,
        value: f64,
        strength: Strength,
    ) -> Result<ConstraintId, SolverError> {
        let expr = Expression::from_variable(var) + -value;
        self.add_constraint(Constraint::new(expr, Relation::Equal, strength))
    }

    /// Update all variable values after solving.
    pub fn update_variables(&mut self) {
        for (&var, symbol) in &self.var_symbols {
            let value = self.rows.get(symbol).map_or(0.0, |row| row.constant);
            // Snap rounding noise (and -0.0) to zero
            let value = if near_zero(value) { 0.0 } else { value };
            self.values.insert(var, value);
        }
    }

    /// The external symbol for a variable, created on first use.
    fn var_symbol(&mut self, var: Variable) -> Symbol {
        if let Some(&symbol) = self.var_symbols.get(&var) {
            return symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.var_symbols.insert(var, symbol);
        symbol
    }

    /// Create a row for a constraint.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let mut row = Row::new(constraint.expression.constant);

        // Add the terms to the row, substituting basic variables
        for term in &constraint.expression.terms {
            if near_zero(term.coefficient) {
                continue;
            }
            let symbol = self.var_symbol(term.variable);
            match self.rows.get(&symbol) {
                Some(basic_row) => row.insert_row(basic_row, term.coefficient),
                None => row.insert(symbol, term.coefficient),
            }
        }

        let strength = constraint.strength;
        let tag = match constraint.relation {
            Relation::LessOrEqual | Relation::GreaterOrEqual => {
                let coeff = if constraint.relation == Relation::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };

                let slack = self.new_symbol(SymbolKind::Slack);
                row.insert(slack, coeff);

                if strength.is_required() {
                    Tag { marker: slack, other: None }
                } else {
                    let error = self.new_symbol(SymbolKind::Error);
                    row.insert(error, -coeff);
                    self.objective.insert(error, strength.0);
                    Tag { marker: slack, other: Some(error) }
                }
            }
            Relation::Equal => {
                if strength.is_required() {
                    let dummy = self.new_symbol(SymbolKind::Dummy);
                    row.insert(dummy, 1.0);
                    Tag { marker: dummy, other: None }
                } else {
                    let errplus = self.new_symbol(SymbolKind::Error);
                    let errminus = self.new_symbol(SymbolKind::Error);
                    row.insert(errplus, -1.0);
                    row.insert(errminus, 1.0);
                    self.objective.insert(errplus, strength.0);
                    self.objective.insert(errminus, strength.0);
                    Tag { marker: errplus, other: Some(errminus) }
                }
            }
        };

        // Ensure the constant is non-negative
        if row.constant < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Generate a new symbol.
    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        let id = self.symbol_counter;
        self.symbol_counter += 1;
        Symbol { id, kind }
    }

    /// Choose a subject for the row.
    ///
    /// External symbols win. Otherwise a slack or error marker is usable only
    /// if its coefficient is negative, which keeps the row constant feasible.
    fn choose_subject(&self, row: &Row, tag: &Tag) -> Option<Symbol> {
        if let Some(&symbol) = row.cells.keys().find(|s| s.is_external()) {
            return Some(symbol);
        }

        std::iter::once(tag.marker)
            .chain(tag.other)
            .find(|&s| s.is_pivotable() && row.coefficient(s) < 0.0)
    }

    /// Add a row through an artificial variable. Returns whether the row
    /// could be satisfied.
    fn add_with_artificial_variable(&mut self, row: Row) -> Result<bool, SolverError> {
        let art = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(art, row.clone());
        self.artificial = Some(row);

        // Optimize the artificial objective
        self.optimize(Objective::Artificial)?;
        let success = self
            .artificial
            .take()
            .is_some_and(|objective| near_zero(objective.constant));

        // If the artificial variable is still basic, pivot it out
        if let Some(mut art_row) = self.rows.remove(&art) {
            if art_row.cells.is_empty() {
                return Ok(success);
            }
            let Some(entering) = art_row.cells.keys().copied().find(Symbol::is_pivotable) else {
                return Ok(false);
            };
            art_row.solve_for_symbols(art, entering);
            self.substitute(entering, &art_row);
            self.rows.insert(entering, art_row);
        }

        // Remove the artificial variable from the tableau
        for r in self.rows.values_mut() {
            r.remove(art);
        }
        self.objective.remove(art);
        Ok(success)
    }

    /// Substitute a symbol throughout the tableau.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for r in self.rows.values_mut() {
            r.substitute(symbol, row);
        }
        self.objective.substitute(symbol, row);
        if let Some(art) = self.artificial.as_mut() {
            art.substitute(symbol, row);
        }
    }

    /// Optimize an objective function using the simplex algorithm.
    fn optimize(&mut self, which: Objective) -> Result<(), SolverError> {
        loop {
            let objective = match which {
                Objective::Main => &self.objective,
                Objective::Artificial => match &self.artificial {
                    Some(row) => row,
                    None => return Ok(()),
                },
            };

            let Some(entering) = objective.entering_symbol() else {
                return Ok(()); // Optimal
            };

            let Some(leaving) = self.leaving_row(entering) else {
                return Err(SolverError::Unbounded);
            };
            let mut row = self
                .rows
                .remove(&leaving)
                .ok_or(SolverError::InternalError("Leaving row vanished"))?;

            // Pivot
            row.solve_for_symbols(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
    }

    /// Find the row to leave the basis (minimum ratio test).
    fn leaving_row(&self, entering: Symbol) -> Option<Symbol> {
        let mut min_ratio = f64::MAX;
        let mut leaving = None;

        for (&symbol, row) in &self.rows {
            if symbol.is_external() {
                continue;
            }

            let coeff = row.coefficient(entering);
            if coeff < 0.0 {
                let ratio = -row.constant / coeff;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    leaving = Some(symbol);
                }
            }
        }

        leaving
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Objective: {}", self.objective)?;
        writeln!(f, "Tableau ({} rows):", self.rows.len())?;
        for (symbol, row) in &self.rows {
            writeln!(f, "  {} = {}", symbol, row)?;
        }
        let errors = self
            .constraints
            .values()
            .filter(|tag| tag.marker.is_error() || tag.other.is_some_and(|s| s.is_error()))
            .count();
        writeln!(
            f,
            "Constraints: {} ({} with error terms)",
            self.constraints.len(),
            errors
        )?;
        for (var, symbol) in &self.var_symbols {
            let value = self.values.get(var).copied().unwrap_or(0.0);
            writeln!(f, "  {} ({}) = {}", var, symbol, value)?;
        }
        Ok(())
    }
}
