use rustc_hash::FxHashMap;

use super::labels::LabelStack;
use crate::{
    location::{CatchClause, Location, LocationId, LocationKind},
    stmt::Stmt,
    symbol::{Label, Name, Var},
    ty::Type,
};

/// Keywords reserved by the lowering's own synthetic-label scheme (§4.1: "Reserved keywords used
/// as user labels are suffixed with `_label`").
const RESERVED_LABEL_WORDS: &[&str] = &["do", "while", "for", "switch", "label", "if", "else"];

/// Mutable per-method state threaded through the recursive translator.
///
/// This replaces the original's `MethodBodyVisitor` mutable-builder pattern (`resultHolder`,
/// `LHS`, `isLeft` toggle) per the Design Notes: rather than a visitor with side-channel toggles,
/// every lowering function takes `&mut Lowerer` explicitly and returns the `Var` holding its
/// result (or nothing, for statements), so there is no hidden order dependence.
pub struct Lowerer {
    locations: Vec<Location>,
    line_count: u32,
    label_count: u32,
    temp_counters: FxHashMap<&'static str, u32>,
    dynamic_temp_counters: FxHashMap<String, u32>,
    synthetic_label_counters: FxHashMap<&'static str, u32>,
    shadow_counters: FxHashMap<String, u32>,
    scopes: Vec<FxHashMap<String, Name>>,
    locals: FxHashMap<Name, Type>,
    pub(super) label_stack: LabelStack,
    catches: Vec<CatchClause>,
}

impl Lowerer {
    pub fn new() -> Self {
        Self {
            locations: Vec::new(),
            line_count: 0,
            label_count: 0,
            temp_counters: FxHashMap::default(),
            dynamic_temp_counters: FxHashMap::default(),
            synthetic_label_counters: FxHashMap::default(),
            shadow_counters: FxHashMap::default(),
            scopes: vec![FxHashMap::default()],
            locals: FxHashMap::default(),
            label_stack: LabelStack::new(),
            catches: Vec::new(),
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop().expect("scope stack underflow");
    }

    /// Declare a user-named local in the current scope, reconciling it against the flat locals
    /// table (§4.1: "a shadow map reconciles user names against the flat output table when a
    /// later declaration would alias an earlier one of a different type").
    pub fn declare_local(&mut self, user_name: &str, ty: Type) -> Var {
        let candidate = Name::new(user_name);
        let final_name = match self.locals.get(&candidate) {
            Some(existing_ty) if *existing_ty != ty => {
                let counter = self.shadow_counters.entry(user_name.to_string()).or_insert(0);
                *counter += 1;
                Name::new(format!("{user_name}${}", *counter))
            }
            _ => candidate,
        };
        self.locals.insert(final_name.clone(), ty);
        self.scopes
            .last_mut()
            .expect("no active scope")
            .insert(user_name.to_string(), final_name.clone());
        final_name
    }

    /// Resolve a user-written identifier to its flat name, searching inner-to-outer scopes.
    pub fn resolve_var(&self, user_name: &str) -> Option<Var> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(user_name))
            .cloned()
    }

    /// Allocate a fresh temporary of the given type, using the type-prefixed naming scheme with
    /// monotonic suffixing on collisions (§4.1): the first use of a prefix gets the bare prefix,
    /// later ones get `prefix` + the 1-based collision count.
    pub fn fresh_temp(&mut self, ty: Type) -> Var {
        let prefix = ty.temp_prefix();
        let name = Self::next_temp_name(&mut self.temp_counters, prefix);
        self.locals.insert(name.clone(), ty);
        name
    }

    /// Allocate a fresh array-allocation temporary named `<BaseName>_arr<N>_temp` (§8 scenario 2).
    pub fn fresh_array_temp(&mut self, element: &Type, rank: u8) -> Var {
        let base = array_base_name(element);
        let prefix = format!("{base}_arr{rank}_temp");
        let counter = self.dynamic_temp_counters.entry(prefix.clone()).or_insert(0);
        let idx = *counter;
        *counter += 1;
        let name = if idx == 0 {
            Name::new(prefix)
        } else {
            Name::new(format!("{prefix}{idx}"))
        };
        self.locals.insert(name.clone(), Type::array(element.clone(), rank));
        name
    }

    fn next_temp_name(counters: &mut FxHashMap<&'static str, u32>, prefix: &'static str) -> Var {
        let counter = counters.entry(prefix).or_insert(0);
        let idx = *counter;
        *counter += 1;
        if idx == 0 {
            Name::new(prefix)
        } else {
            Name::new(format!("{prefix}{idx}"))
        }
    }

    /// Allocate a fresh synthetic label of the given construct kind, e.g. `fresh_label("While_start")`
    /// produces `While_start_0`, then `While_start_1`, etc (§4.1).
    pub fn fresh_label(&mut self, kind: &'static str) -> Label {
        let counter = self.synthetic_label_counters.entry(kind).or_insert(0);
        let idx = *counter;
        *counter += 1;
        Label::new(format!("{kind}_{idx}"))
    }

    /// Translate a user-declared statement label, suffixing with `_label` if it collides with a
    /// word reserved by the synthetic-label scheme (§4.1). Called on every user label the
    /// translator sees (`translate.rs`'s `escape_user_label`) before it's used as a `LabelStack`
    /// matching key, whether that's where a loop frame is pushed or where a labeled
    /// `break`/`continue` resolves against one — the escaped text itself is never emitted as a
    /// jump target (jump targets are always one of this module's own fresh synthetic labels).
    pub fn translate_user_label(&self, name: &str) -> Label {
        if RESERVED_LABEL_WORDS.contains(&name) {
            Label::new(format!("{name}_label"))
        } else {
            Label::new(name)
        }
    }

    pub fn emit_stmt(&mut self, stmt: Stmt) -> LocationId {
        let id = LocationId(self.locations.len() as u32);
        let display_index = self.line_count + self.label_count;
        self.line_count += 1;
        self.locations.push(Location {
            id,
            display_index,
            kind: LocationKind::Stmt(stmt),
        });
        id
    }

    pub fn emit_label(&mut self, label: Label) -> LocationId {
        let id = LocationId(self.locations.len() as u32);
        let display_index = self.line_count + self.label_count;
        self.label_count += 1;
        self.locations.push(Location {
            id,
            display_index,
            kind: LocationKind::Label(label),
        });
        id
    }

    pub fn add_catch(&mut self, catch: CatchClause) {
        self.catches.push(catch);
    }

    pub fn next_location_id(&self) -> LocationId {
        LocationId(self.locations.len() as u32)
    }

    pub fn type_of(&self, var: &Var) -> Option<&Type> {
        self.locals.get(var)
    }

    pub fn finish(self) -> (Vec<Location>, FxHashMap<Name, Type>, Vec<CatchClause>) {
        (self.locations, self.locals, self.catches)
    }
}

fn array_base_name(ty: &Type) -> String {
    match ty {
        Type::Reference(name) => {
            // Use the simple (last-segment) name rather than the fully-qualified one, to keep
            // generated temp names readable, e.g. `Box_arr1_temp` rather than
            // `com.example.Box_arr1_temp`.
            name.as_str().rsplit(['.', '/']).next().unwrap_or(name.as_str()).to_string()
        }
        other => other.temp_prefix().trim_end_matches("_temp").to_string(),
    }
}
