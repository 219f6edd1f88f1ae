use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use survival_fire_core::{ActorId, Inventory, InventoryProvider, ItemDef};

/// Host inventory access, passed to calls that touch an actor's items.
///
/// Every callback receives `user_data` unchanged along with the actor id.
/// Item ids and display names are null-terminated UTF-8 and only valid for
/// the duration of the callback. A missing callback behaves as an empty
/// inventory that accepts nothing.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct InventoryCallbacks {
    pub user_data: *mut c_void,
    /// Whether the actor holds at least `quantity` of the item
    pub has_item: Option<
        extern "C" fn(user_data: *mut c_void, actor: u32, item_id: *const c_char, quantity: u32) -> bool,
    >,
    /// Remove `quantity` of the item; return false and change nothing if short
    pub remove_item: Option<
        extern "C" fn(user_data: *mut c_void, actor: u32, item_id: *const c_char, quantity: u32) -> bool,
    >,
    /// Add `quantity` of the item; return false if it does not fit
    pub add_item: Option<
        extern "C" fn(
            user_data: *mut c_void,
            actor: u32,
            item_id: *const c_char,
            display_name: *const c_char,
            quantity: u32,
        ) -> bool,
    >,
    pub item_count:
        Option<extern "C" fn(user_data: *mut c_void, actor: u32, item_id: *const c_char) -> u32>,
}

/// One actor's inventory, seen through the host callbacks
pub(crate) struct CallbackInventory {
    callbacks: InventoryCallbacks,
    actor: u32,
}

impl CallbackInventory {
    pub(crate) fn new(callbacks: InventoryCallbacks, actor: ActorId) -> Self {
        Self {
            callbacks,
            actor: actor.0,
        }
    }
}

impl Inventory for CallbackInventory {
    fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        let (Some(has_item), Ok(item)) = (self.callbacks.has_item, CString::new(item_id)) else {
            return false;
        };
        has_item(self.callbacks.user_data, self.actor, item.as_ptr(), quantity)
    }

    fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        let (Some(remove_item), Ok(item)) = (self.callbacks.remove_item, CString::new(item_id))
        else {
            return false;
        };
        remove_item(self.callbacks.user_data, self.actor, item.as_ptr(), quantity)
    }

    fn add_item(&mut self, item: &ItemDef, quantity: u32) -> bool {
        let Some(add_item) = self.callbacks.add_item else {
            return false;
        };
        let (Ok(id), Ok(name)) = (
            CString::new(item.id.as_str()),
            CString::new(item.display_name.as_str()),
        ) else {
            return false;
        };
        add_item(
            self.callbacks.user_data,
            self.actor,
            id.as_ptr(),
            name.as_ptr(),
            quantity,
        )
    }

    fn item_count(&self, item_id: &str) -> u32 {
        let (Some(item_count), Ok(item)) = (self.callbacks.item_count, CString::new(item_id)) else {
            return 0;
        };
        item_count(self.callbacks.user_data, self.actor, item.as_ptr())
    }
}

/// Inventories of every actor, resolved through the host callbacks.
///
/// `None` callbacks mean the host has no inventories at all.
pub(crate) struct CallbackInventories {
    callbacks: Option<InventoryCallbacks>,
    current: Option<CallbackInventory>,
}

impl CallbackInventories {
    /// # Safety
    /// `callbacks` must be null or point to a valid `InventoryCallbacks`.
    pub(crate) unsafe fn from_ptr(callbacks: *const InventoryCallbacks) -> Self {
        Self {
            // SAFETY: upheld by the caller
            callbacks: unsafe { callbacks.as_ref() }.copied(),
            current: None,
        }
    }
}

impl InventoryProvider for CallbackInventories {
    fn inventory_mut(&mut self, actor: ActorId) -> Option<&mut dyn Inventory> {
        let callbacks = self.callbacks?;
        let inventory = self.current.insert(CallbackInventory::new(callbacks, actor));
        Some(inventory)
    }
}
