use crate::{MarkerName, ParameterSlot};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectWhere,
    SqlSelectOrderBy,
    SqlCount,
    SqlExecute,
}

/// State carried while rendering one statement.
#[derive(Debug, Clone, Copy)]
pub struct Context<'s> {
    /// Number of parameters written so far.
    pub counter: u32,
    pub fragment: Fragment,
    pub qualify_columns: bool,
    /// Parameter layout of the statement being rendered.
    pub slots: &'s [ParameterSlot],
}

impl<'s> Context<'s> {
    pub fn new(fragment: Fragment, slots: &'s [ParameterSlot]) -> Self {
        Self {
            counter: 0,
            fragment,
            qualify_columns: true,
            slots,
        }
    }
    /// Slots assigned to the named marker `name`.
    pub fn slots_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'s ParameterSlot> + 'a {
        self.slots
            .iter()
            .filter(move |v| matches!(&v.marker, MarkerName::Named(n) if n.as_ref() == name))
    }
    pub fn switch_fragment<'c>(&'c mut self, fragment: Fragment) -> ContextUpdater<'c, 's> {
        ContextUpdater {
            current: Context { fragment, ..*self },
            previous: self,
        }
    }
}

impl Default for Context<'_> {
    fn default() -> Self {
        Context::new(Fragment::None, &[])
    }
}

/// Scoped fragment switch, the parameter counter flows back to the parent on drop.
pub struct ContextUpdater<'c, 's> {
    pub current: Context<'s>,
    pub previous: &'c mut Context<'s>,
}

impl Drop for ContextUpdater<'_, '_> {
    fn drop(&mut self) {
        self.previous.counter = self.current.counter;
    }
}
