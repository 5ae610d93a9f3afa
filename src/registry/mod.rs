//! Flavor Registry
//!
//! Bidirectional, priority-ordered mapping between platform natives and
//! flavors. Missing entries are synthesized on demand through the
//! [`codec`](crate::flavor::codec), text flavors are expanded into their
//! equivalence family, and query results are memoized per key.
//!
//! # Locking
//!
//! All state (lazy load, both maps, both caches, the override sets) sits
//! behind one mutex and every public operation holds it for its full
//! duration, so a mutation and the cache invalidation it causes are observed
//! together.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::error::{FlavorMapError, Result};
use crate::flavor::{codec, Flavor, Native, TEXT_PLAIN_BASE_TYPE};
use crate::text::TextExpander;

pub mod cache;
pub mod ordered;
pub mod source;

pub use cache::{CacheStats, ResultCache};
pub use ordered::{OrderedMultiMap, OrderedSet};
pub use source::{
    BuiltinSource, FileSource, LoadedMappings, MappingDiagnostic, MappingSource, StringSource,
    BUILTIN_MAPPINGS,
};

/// Default number of memoized results per direction
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Mutable registry state, guarded by the registry mutex
#[derive(Debug)]
struct RegistryState {
    native_to_flavors: OrderedMultiMap<Native, Flavor>,
    flavor_to_natives: OrderedMultiMap<Flavor, Native>,
    /// Text base type (`text/plain`) to natives, from mapping sources only
    text_type_to_natives: OrderedMultiMap<String, Native>,
    /// Flavors whose natives were replaced wholesale; never synthesized again
    explicit_flavors: HashSet<Flavor>,
    /// Natives whose flavors were replaced wholesale; never expanded again
    explicit_natives: HashSet<Native>,
    natives_cache: ResultCache<Flavor, Native>,
    flavors_cache: ResultCache<Native, Flavor>,
    initialized: bool,
    diagnostics: Vec<MappingDiagnostic>,
}

impl RegistryState {
    fn new(cache_capacity: usize) -> Self {
        Self {
            native_to_flavors: OrderedMultiMap::new(),
            flavor_to_natives: OrderedMultiMap::new(),
            text_type_to_natives: OrderedMultiMap::new(),
            explicit_flavors: HashSet::new(),
            explicit_natives: HashSet::new(),
            natives_cache: ResultCache::new(cache_capacity),
            flavors_cache: ResultCache::new(cache_capacity),
            initialized: false,
            diagnostics: Vec::new(),
        }
    }

    /// Store source mappings in both directions, text also by base type
    fn apply(&mut self, loaded: LoadedMappings) {
        for (native, flavor) in loaded.pairs {
            if flavor.is_text() {
                self.text_type_to_natives.insert(flavor.base_type(), native.clone());
            }
            self.flavor_to_natives.insert(flavor.clone(), native.clone());
            self.native_to_flavors.insert(native, flavor);
        }
        self.diagnostics.extend(loaded.diagnostics);
    }

    /// Every native known in either direction, first seen first
    fn all_natives(&self) -> Vec<Native> {
        let mut natives: OrderedSet<Native> = self.native_to_flavors.keys().cloned().collect();
        natives.extend(self.flavor_to_natives.values().cloned());
        natives.to_vec()
    }

    /// Record a synthesized `native <-> flavor` pair
    ///
    /// A side that was explicitly replaced and still has entries is left
    /// alone.
    fn register_synthesized(&mut self, native: &Native, flavor: &Flavor) {
        let flavor_locked = self.explicit_flavors.contains(flavor)
            && self.flavor_to_natives.get(flavor).is_some_and(|n| !n.is_empty());
        if !flavor_locked {
            self.flavor_to_natives.insert(flavor.clone(), native.clone());
            self.natives_cache.invalidate(flavor);
        }

        let native_locked = self.explicit_natives.contains(native)
            && self.native_to_flavors.get(native).is_some_and(|f| !f.is_empty());
        if !native_locked {
            self.native_to_flavors.insert(native.clone(), flavor.clone());
            self.flavors_cache.invalidate(native);
        }
    }

    /// Natives mapped to `flavor`, synthesizing an encoded one if none are
    fn natives_or_synthesize(&mut self, flavor: &Flavor) -> Vec<Native> {
        let existing = self.flavor_to_natives.get_vec(flavor);
        if !existing.is_empty() {
            return existing;
        }

        let native = codec::encode_flavor(flavor);
        debug!("Synthesized native '{}' for flavor '{}'", native, flavor);
        self.register_synthesized(&native, flavor);
        vec![native]
    }

    /// Natives seeded from the text buckets, then the flavor's own natives
    fn text_natives(&mut self, flavor: &Flavor, include_plain: bool) -> Vec<Native> {
        let mut natives: OrderedSet<Native> = OrderedSet::new();
        natives.extend(self.text_type_to_natives.get_vec(flavor.base_type().as_str()));
        if include_plain {
            natives.extend(self.text_type_to_natives.get_vec(TEXT_PLAIN_BASE_TYPE));
        }

        if natives.is_empty() {
            return self.natives_or_synthesize(flavor);
        }

        natives.extend(self.flavor_to_natives.get_vec(flavor));
        natives.to_vec()
    }
}

/// Registry construction options
pub struct RegistryBuilder {
    sources: Vec<Box<dyn MappingSource>>,
    charsets: Option<Vec<String>>,
    cache_capacity: usize,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            charsets: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl RegistryBuilder {
    /// Add a mapping source; sources are read in the order added
    pub fn source(mut self, source: impl MappingSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Add an already boxed mapping source
    pub fn boxed_source(mut self, source: Box<dyn MappingSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Charsets offered for text, best first
    pub fn charsets<I, S>(mut self, charsets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.charsets = Some(charsets.into_iter().map(Into::into).collect());
        self
    }

    /// Results memoized per direction; zero disables memoization
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Build the registry; sources are not read until first use
    pub fn build(self) -> FlavorRegistry {
        let expander = match self.charsets {
            Some(charsets) => TextExpander::new(charsets),
            None => TextExpander::default(),
        };

        FlavorRegistry {
            state: Mutex::new(RegistryState::new(self.cache_capacity)),
            sources: self.sources,
            expander,
        }
    }
}

/// Snapshot of registry size and cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Natives with at least one flavor mapping
    pub natives: usize,
    /// Flavors with at least one native mapping
    pub flavors: usize,
    /// Keys exempt from synthesis and expansion
    pub explicit_keys: usize,
    /// flavor -> natives memo
    pub natives_cache: CacheStats,
    /// native -> flavors memo
    pub flavors_cache: CacheStats,
}

/// Native <-> flavor negotiation registry
///
/// One instance per isolation scope. Cheap to share behind an `Arc`; every
/// operation takes `&self`.
///
/// # Example
///
/// ```
/// use lamco_flavormap::{Flavor, FlavorRegistry, Native, Representation};
///
/// let registry = FlavorRegistry::empty();
/// let flavor = Flavor::new("application", "x-foo", Representation::Object).unwrap();
///
/// let natives = registry.natives_for(Some(&flavor));
/// assert_eq!(natives, vec![Native::from("ENCODED:application/x-foo")]);
/// assert_eq!(registry.flavors_for(Some(&natives[0])), vec![flavor]);
/// ```
pub struct FlavorRegistry {
    state: Mutex<RegistryState>,
    sources: Vec<Box<dyn MappingSource>>,
    expander: TextExpander,
}

impl fmt::Debug for FlavorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlavorRegistry")
            .field("sources", &self.sources)
            .field("charsets", &self.expander.charsets())
            .finish_non_exhaustive()
    }
}

impl Default for FlavorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FlavorRegistry {
    /// Registry seeded from the built-in Wayland/X11 table
    pub fn new() -> Self {
        Self::builder().source(BuiltinSource).build()
    }

    /// Registry with no mapping sources
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Start configuring a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Load the mapping sources now and report a failed load
    ///
    /// Loading happens at most once. Other operations load lazily and only
    /// log a failure; after a failed load the registry carries on with an
    /// empty table.
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_initialized(&mut state)
    }

    fn ensure_initialized(&self, state: &mut RegistryState) -> Result<()> {
        if state.initialized {
            return Ok(());
        }
        state.initialized = true;

        let loaded = source::load_sources(&self.sources)?;
        info!(
            "Loaded {} flavor mappings from {} source(s), {} line(s) skipped",
            loaded.pairs.len(),
            self.sources.len(),
            loaded.diagnostics.len()
        );
        state.apply(loaded);
        Ok(())
    }

    /// Lock, loading sources first if this is the first use
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        let mut state = self.state.lock();
        if let Err(e) = self.ensure_initialized(&mut state) {
            error!("Failed to load flavor mappings, continuing with an empty table: {}", e);
        }
        state
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Natives for a flavor, best first
    ///
    /// `None` lists every known native. An unknown non-text flavor gets a
    /// synthesized encoded native, registered in both directions.
    pub fn natives_for(&self, flavor: Option<&Flavor>) -> Vec<Native> {
        let mut state = self.lock();
        match flavor {
            Some(flavor) => Self::natives_for_locked(&mut state, flavor),
            None => state.all_natives(),
        }
    }

    fn natives_for_locked(state: &mut RegistryState, flavor: &Flavor) -> Vec<Native> {
        if let Some(cached) = state.natives_cache.get(flavor) {
            return cached;
        }

        let natives = if state.explicit_flavors.contains(flavor) {
            state.flavor_to_natives.get_vec(flavor)
        } else if flavor.is_charset_text() {
            state.text_natives(flavor, true)
        } else if flavor.is_noncharset_text() {
            state.text_natives(flavor, false)
        } else {
            state.natives_or_synthesize(flavor)
        };

        state.natives_cache.put(flavor.clone(), natives.clone());
        natives
    }

    /// Flavors for a native, best first
    ///
    /// `None` unions the flavors of every known native. Text flavors pull in
    /// their whole equivalence family right after themselves.
    pub fn flavors_for(&self, native: Option<&Native>) -> Vec<Flavor> {
        let mut state = self.lock();
        match native {
            Some(native) => self.flavors_for_locked(&mut state, native),
            None => self.all_flavors_locked(&mut state),
        }
    }

    fn all_flavors_locked(&self, state: &mut RegistryState) -> Vec<Flavor> {
        let mut flavors = OrderedSet::new();
        for native in state.all_natives() {
            flavors.extend(self.flavors_for_locked(state, &native));
        }
        flavors.to_vec()
    }

    fn flavors_for_locked(&self, state: &mut RegistryState, native: &Native) -> Vec<Flavor> {
        if let Some(cached) = state.flavors_cache.get(native) {
            return cached;
        }

        let flavors = if state.explicit_natives.contains(native) {
            state.native_to_flavors.get_vec(native)
        } else {
            let mut mapped = state.native_to_flavors.get_vec(native);
            if mapped.is_empty() {
                match codec::decode_flavor(native.as_str()) {
                    Some(Ok(flavor)) => {
                        debug!("Synthesized flavor '{}' for native '{}'", flavor, native);
                        state.register_synthesized(native, &flavor);
                        mapped.push(flavor);
                    }
                    Some(Err(e)) => debug!("Ignoring undecodable native '{}': {}", native, e),
                    None => {}
                }
            }

            let mut expanded = OrderedSet::new();
            for flavor in mapped {
                let text_base = flavor.is_text().then(|| flavor.base_type());
                expanded.insert(flavor);
                if let Some(base_type) = text_base {
                    expanded.extend(self.expander.expand(&base_type));
                }
            }
            expanded.to_vec()
        };

        state.flavors_cache.put(native.clone(), flavors.clone());
        flavors
    }

    /// Most preferred native for each flavor
    ///
    /// An empty slice means every known flavor. Flavors without any native
    /// are left out.
    pub fn natives_map_for(&self, flavors: &[Flavor]) -> IndexMap<Flavor, Native> {
        let mut state = self.lock();
        let flavors = if flavors.is_empty() {
            self.all_flavors_locked(&mut state)
        } else {
            flavors.to_vec()
        };

        let mut map = IndexMap::new();
        for flavor in flavors {
            if let Some(native) = Self::natives_for_locked(&mut state, &flavor).into_iter().next() {
                map.insert(flavor, native);
            }
        }
        map
    }

    /// Most preferred flavor for each native
    ///
    /// An empty slice means every known native. Natives without any flavor
    /// are left out.
    pub fn flavors_map_for(&self, natives: &[Native]) -> IndexMap<Native, Flavor> {
        let mut state = self.lock();
        let natives = if natives.is_empty() {
            state.all_natives()
        } else {
            natives.to_vec()
        };

        let mut map = IndexMap::new();
        for native in natives {
            if let Some(flavor) = self.flavors_for_locked(&mut state, &native).into_iter().next() {
                map.insert(native, flavor);
            }
        }
        map
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append `native` to the natives of `flavor` (one direction only)
    ///
    /// No-op if already present; existing priority is untouched.
    pub fn add_unencoded_native_for_flavor(&self, flavor: &Flavor, native: &Native) -> Result<()> {
        require_native(native)?;

        let mut state = self.lock();
        if state.flavor_to_natives.insert(flavor.clone(), native.clone()) {
            debug!("Added native '{}' for flavor '{}'", native, flavor);
        }
        state.natives_cache.invalidate(flavor);
        Ok(())
    }

    /// Append `flavor` to the flavors of `native` (one direction only)
    ///
    /// No-op if already present; existing priority is untouched.
    pub fn add_flavor_for_unencoded_native(&self, native: &Native, flavor: &Flavor) -> Result<()> {
        require_native(native)?;

        let mut state = self.lock();
        if state.native_to_flavors.insert(native.clone(), flavor.clone()) {
            debug!("Added flavor '{}' for native '{}'", flavor, native);
        }
        state.flavors_cache.invalidate(native);
        Ok(())
    }

    /// Replace the natives of `flavor` and exempt it from synthesis
    ///
    /// Duplicates collapse onto their first occurrence.
    pub fn set_natives_for_flavor(&self, flavor: &Flavor, natives: &[Native]) -> Result<()> {
        for native in natives {
            require_native(native)?;
        }

        let mut state = self.lock();
        state
            .flavor_to_natives
            .replace(flavor.clone(), natives.iter().cloned().collect());
        state.explicit_flavors.insert(flavor.clone());
        state.natives_cache.invalidate(flavor);
        debug!("Set {} native(s) for flavor '{}'", natives.len(), flavor);
        Ok(())
    }

    /// Replace the flavors of `native` and exempt it from expansion
    ///
    /// Duplicates collapse onto their first occurrence.
    pub fn set_flavors_for_native(&self, native: &Native, flavors: &[Flavor]) -> Result<()> {
        require_native(native)?;

        let mut state = self.lock();
        state
            .native_to_flavors
            .replace(native.clone(), flavors.iter().cloned().collect());
        state.explicit_natives.insert(native.clone());
        state.flavors_cache.invalidate(native);
        debug!("Set {} flavor(s) for native '{}'", flavors.len(), native);
        Ok(())
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Lines skipped while loading the mapping sources
    pub fn diagnostics(&self) -> Vec<MappingDiagnostic> {
        self.lock().diagnostics.clone()
    }

    /// Drop every memoized result
    pub fn clear_cache(&self) {
        let mut state = self.lock();
        state.natives_cache.clear();
        state.flavors_cache.clear();
    }

    /// Size and cache counters
    pub fn stats(&self) -> RegistryStats {
        let state = self.lock();
        RegistryStats {
            natives: state.native_to_flavors.len(),
            flavors: state.flavor_to_natives.len(),
            explicit_keys: state.explicit_flavors.len() + state.explicit_natives.len(),
            natives_cache: state.natives_cache.stats(),
            flavors_cache: state.flavors_cache.stats(),
        }
    }

    /// Charsets offered for text, best first
    pub fn charsets(&self) -> &[String] {
        self.expander.charsets()
    }
}

fn require_native(native: &Native) -> Result<()> {
    if native.is_absent() {
        return Err(FlavorMapError::InvalidArgument("native must not be empty"));
    }
    Ok(())
}
