//! Win32 low-level keyboard hook backend
//!
//! Registers a WH_KEYBOARD_LL hook on a dedicated thread running a Win32
//! message loop (low-level hooks only fire on a thread that pumps
//! messages). The callback reads the live modifier state, asks the policy
//! engine for a verdict, and either suppresses the event or forwards it
//! down the hook chain. Windows enforces a time budget on hook callbacks,
//! so the callback does no allocation, no locking and no I/O.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, VIRTUAL_KEY, VK_CONTROL, VK_LWIN, VK_MENU, VK_RWIN, VK_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL, WM_QUIT,
};

use super::{BlockedKey, HookError};
use crate::policy::{ModifierSnapshot, PolicyEngine, Verdict, VirtualKey};

/// Policy table consulted by the hook callback; built once at first install
static ENGINE: OnceLock<PolicyEngine> = OnceLock::new();
/// Channel for reporting suppressed keys off the hook thread
static VIOLATION_TX: OnceLock<mpsc::Sender<BlockedKey>> = OnceLock::new();
/// Id of the thread running the message loop, for posting WM_QUIT
static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);
/// Join handle of the hook thread, taken on uninstall
static HOOK_THREAD: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);

fn key_held(vk: VIRTUAL_KEY) -> bool {
    // High bit set means the key is down at the moment of the call
    unsafe { GetAsyncKeyState(vk.0 as i32) < 0 }
}

/// Sample the live pressed state of the modifier keys.
///
/// Reads fresh on every call and never fails: a key that cannot be read
/// reports as not pressed, which can only reduce blocking.
fn read_modifiers() -> ModifierSnapshot {
    ModifierSnapshot {
        ctrl: key_held(VK_CONTROL),
        alt: key_held(VK_MENU),
        shift: key_held(VK_SHIFT),
        left_meta: key_held(VK_LWIN),
        right_meta: key_held(VK_RWIN),
    }
}

unsafe extern "system" fn low_level_keyboard_proc(
    code: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if code >= 0 {
        let info = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        let key = VirtualKey(info.vkCode as u16);
        // One snapshot per event: every rule sees the same modifier state.
        let modifiers = read_modifiers();

        if let Some(engine) = ENGINE.get() {
            if engine.evaluate(key, modifiers) == Verdict::Block {
                // Best effort: dropping a report is acceptable, delaying
                // the callback is not.
                if let Some(tx) = VIOLATION_TX.get() {
                    let _ = tx.try_send(BlockedKey { key, modifiers });
                }
                return LRESULT(1);
            }
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}

/// Register the hook and start the message loop thread. Blocks until the
/// thread confirms or rejects OS registration.
pub(super) fn install(violation_tx: mpsc::Sender<BlockedKey>) -> Result<(), HookError> {
    ENGINE.get_or_init(PolicyEngine::new);
    let _ = VIOLATION_TX.set(violation_tx);

    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), String>>();

    let handle = thread::Builder::new()
        .name("keyboard-hook".to_string())
        .spawn(move || {
            let hook = match unsafe {
                SetWindowsHookExW(WH_KEYBOARD_LL, Some(low_level_keyboard_proc), None, 0)
            } {
                Ok(hook) => hook,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };

            HOOK_THREAD_ID.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);
            let _ = ready_tx.send(Ok(()));
            info!("low-level keyboard hook registered");

            let mut msg = MSG::default();
            unsafe {
                while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
                if let Err(e) = UnhookWindowsHookEx(hook) {
                    error!(%e, "failed to remove keyboard hook");
                }
            }
            debug!("keyboard hook thread exiting");
        })
        .map_err(|e| HookError::ThreadSpawn(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => {
            *HOOK_THREAD.lock().unwrap() = Some(handle);
            Ok(())
        }
        Ok(Err(e)) => Err(HookError::Registration(e)),
        Err(_) => Err(HookError::Registration(
            "hook thread exited before confirming registration".into(),
        )),
    }
}

/// Stop the message loop; the hook thread unhooks on its way out.
pub(super) fn uninstall() {
    let thread_id = HOOK_THREAD_ID.swap(0, Ordering::SeqCst);
    if thread_id != 0 {
        // GetMessageW returns 0 on WM_QUIT, ending the loop
        unsafe {
            let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
    }
    if let Some(handle) = HOOK_THREAD.lock().unwrap().take() {
        let _ = handle.join();
    }
}
