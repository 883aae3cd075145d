//! Real-time scheduling helpers (Linux SCHED_FIFO / mlockall).

use crate::cli::RtLock;

#[cfg(all(feature = "rt", target_os = "linux"))]
pub fn setup_rt_once(rt: bool, prio: Option<i32>, lock: RtLock) {
    use libc::{
        MCL_CURRENT, MCL_FUTURE, SCHED_FIFO, mlockall, sched_get_priority_max,
        sched_get_priority_min, sched_param, sched_setscheduler,
    };
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }

    fn try_apply_mem_lock(lock: RtLock) -> eyre::Result<()> {
        let flags = match lock {
            RtLock::None => return Ok(()),
            RtLock::Current => MCL_CURRENT,
            RtLock::All => MCL_CURRENT | MCL_FUTURE,
        };
        let rc = unsafe { mlockall(flags) };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            let mut msg = format!("mlockall({lock:?}) failed: {err}");
            if matches!(err.raw_os_error(), Some(code) if code == libc::EPERM || code == libc::ENOMEM)
            {
                msg.push_str("; hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'");
            }
            eyre::bail!(msg);
        }
        Ok(())
    }

    // Apply SCHED_FIFO priority, clamped to the system range.
    fn try_apply_fifo_priority(prio: Option<i32>) -> eyre::Result<i32> {
        let (min, max) = unsafe {
            let min = sched_get_priority_min(SCHED_FIFO);
            let max = sched_get_priority_max(SCHED_FIFO);
            if min < 0 || max < 0 { (1, 99) } else { (min, max) }
        };
        let prio_val = prio.unwrap_or(max).clamp(min, max);
        let param = sched_param {
            sched_priority: prio_val,
        };
        let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &param) };
        if rc != 0 {
            Err(eyre::eyre!(
                "{}; hint: run with 'sudo' or grant CAP_SYS_NICE: 'sudo setcap cap_sys_nice=ep /path/to/pedalbox'",
                std::io::Error::last_os_error()
            ))
        } else {
            Ok(prio_val)
        }
    }

    RT_ONCE.get_or_init(|| {
        match try_apply_mem_lock(lock) {
            Ok(()) => tracing::info!(?lock, "rt: memory lock applied"),
            Err(err) => tracing::warn!(error = %err, "rt: memory lock not applied"),
        }
        match try_apply_fifo_priority(prio) {
            Ok(p) => tracing::info!(prio = p, "rt: SCHED_FIFO applied"),
            Err(err) => tracing::warn!(error = %err, "rt: SCHED_FIFO not applied"),
        }
    });
}

#[cfg(not(all(feature = "rt", target_os = "linux")))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>, _lock: RtLock) {
    if rt {
        tracing::warn!("--rt ignored: built without the `rt` feature or not on Linux");
    }
}
