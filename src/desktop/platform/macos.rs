//! macOS accessibility backend over the ApplicationServices AX API.

use core_foundation::array::CFArray;
use core_foundation::base::{CFType, CFTypeID, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::number::CFNumber;
use core_foundation::string::CFString;
use core_foundation::{declare_TCFType, impl_TCFType};
use std::ffi::c_void;
use std::ptr;
use tracing::trace;

use super::{Element, Node, TreeAccessor};
use crate::desktop::types::{AttrValue, Point, Size};

type AXError = i32;

const K_AX_ERROR_SUCCESS: AXError = 0;
const K_AX_VALUE_TYPE_CG_POINT: u32 = 1;
const K_AX_VALUE_TYPE_CG_SIZE: u32 = 2;

#[allow(non_camel_case_types)]
#[repr(C)]
pub struct __AXUIElement(c_void);
pub type AXUIElementRef = *const __AXUIElement;

#[repr(C)]
#[derive(Default)]
struct CGPoint {
    x: f64,
    y: f64,
}

#[repr(C)]
#[derive(Default)]
struct CGSize {
    width: f64,
    height: f64,
}

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXUIElementGetTypeID() -> CFTypeID;
    fn AXUIElementCreateApplication(pid: i32) -> AXUIElementRef;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: CFTypeRef,
        value: *mut CFTypeRef,
    ) -> AXError;
    fn AXUIElementCopyActionNames(element: AXUIElementRef, names: *mut CFTypeRef) -> AXError;
    fn AXUIElementPerformAction(element: AXUIElementRef, action: CFTypeRef) -> AXError;
    fn AXValueGetTypeID() -> CFTypeID;
    fn AXValueGetType(value: CFTypeRef) -> u32;
    fn AXValueGetValue(value: CFTypeRef, value_type: u32, out: *mut c_void) -> u8;
    fn AXIsProcessTrusted() -> u8;
}

declare_TCFType!(AXUIElement, AXUIElementRef);
impl_TCFType!(AXUIElement, AXUIElementRef, AXUIElementGetTypeID);

pub fn is_process_trusted() -> bool {
    unsafe { AXIsProcessTrusted() != 0 }
}

/// Accessor producing live `AXUIElement` handles
#[derive(Default)]
pub struct MacAccessor;

impl MacAccessor {
    pub fn new() -> Self {
        Self
    }
}

impl TreeAccessor for MacAccessor {
    fn application(&self, pid: u32) -> Node {
        let element = unsafe {
            AXUIElement::wrap_under_create_rule(AXUIElementCreateApplication(pid as i32))
        };
        Node::new(MacElement { element })
    }
}

struct MacElement {
    element: AXUIElement,
}

impl MacElement {
    fn copy_attribute(&self, name: &str) -> Option<CFType> {
        let attribute = CFString::new(name);
        let mut value: CFTypeRef = ptr::null();
        let err = unsafe {
            AXUIElementCopyAttributeValue(
                self.element.as_concrete_TypeRef(),
                attribute.as_CFTypeRef(),
                &mut value,
            )
        };
        if err != K_AX_ERROR_SUCCESS || value.is_null() {
            if err != K_AX_ERROR_SUCCESS {
                trace!("{} unavailable (AXError {})", name, err);
            }
            return None;
        }
        Some(unsafe { CFType::wrap_under_create_rule(value) })
    }
}

fn as_array(value: &CFType) -> Option<CFArray<CFType>> {
    if value.type_of() != CFArray::<CFType>::type_id() {
        return None;
    }
    Some(unsafe { CFArray::<CFType>::wrap_under_get_rule(value.as_CFTypeRef() as _) })
}

fn as_element(value: &CFType) -> Option<Node> {
    if value.type_of() != AXUIElement::type_id() {
        return None;
    }
    let element = unsafe { AXUIElement::wrap_under_get_rule(value.as_CFTypeRef() as AXUIElementRef) };
    Some(Node::new(MacElement { element }))
}

fn ax_value(value: &CFType) -> AttrValue {
    let raw = value.as_CFTypeRef();
    let kind = unsafe { AXValueGetType(raw) };
    match kind {
        K_AX_VALUE_TYPE_CG_POINT => {
            let mut point = CGPoint::default();
            let ok = unsafe { AXValueGetValue(raw, kind, &mut point as *mut CGPoint as *mut c_void) };
            if ok != 0 {
                AttrValue::Point(Point::new(point.x, point.y))
            } else {
                AttrValue::Null
            }
        }
        K_AX_VALUE_TYPE_CG_SIZE => {
            let mut size = CGSize::default();
            let ok = unsafe { AXValueGetValue(raw, kind, &mut size as *mut CGSize as *mut c_void) };
            if ok != 0 {
                AttrValue::Size(Size::new(size.width, size.height))
            } else {
                AttrValue::Null
            }
        }
        other => AttrValue::Unsupported(format!("AXValue type {other}")),
    }
}

fn convert(value: CFType) -> AttrValue {
    if let Some(s) = value.downcast::<CFString>() {
        return AttrValue::Text(s.to_string());
    }
    if let Some(b) = value.downcast::<CFBoolean>() {
        return AttrValue::Bool(b.into());
    }
    if let Some(n) = value.downcast::<CFNumber>() {
        return n.to_f64().map(AttrValue::Number).unwrap_or_default();
    }
    if value.type_of() == unsafe { AXValueGetTypeID() } {
        return ax_value(&value);
    }
    if let Some(array) = as_array(&value) {
        return AttrValue::Unsupported(format!("array[{}]", array.len()));
    }
    if value.type_of() == AXUIElement::type_id() {
        return AttrValue::Unsupported("AXUIElement".to_string());
    }
    AttrValue::Unsupported(format!("CFType {}", value.type_of()))
}

impl Element for MacElement {
    fn attribute(&self, name: &str) -> Option<AttrValue> {
        self.copy_attribute(name).map(convert)
    }

    fn children(&self) -> Vec<Node> {
        self.copy_attribute(super::attrs::CHILDREN)
            .as_ref()
            .and_then(as_array)
            .map(|items| items.iter().filter_map(|item| as_element(&item)).collect())
            .unwrap_or_default()
    }

    fn element_attribute(&self, name: &str) -> Option<Node> {
        self.copy_attribute(name).as_ref().and_then(as_element)
    }

    fn action_names(&self) -> Vec<String> {
        let mut names: CFTypeRef = ptr::null();
        let err = unsafe { AXUIElementCopyActionNames(self.element.as_concrete_TypeRef(), &mut names) };
        if err != K_AX_ERROR_SUCCESS || names.is_null() {
            return Vec::new();
        }
        let names = unsafe { CFType::wrap_under_create_rule(names) };
        as_array(&names)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.downcast::<CFString>())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn perform_action(&self, name: &str) -> bool {
        let action = CFString::new(name);
        let err = unsafe {
            AXUIElementPerformAction(self.element.as_concrete_TypeRef(), action.as_CFTypeRef())
        };
        if err != K_AX_ERROR_SUCCESS {
            trace!("{} refused (AXError {})", name, err);
        }
        err == K_AX_ERROR_SUCCESS
    }
}
