//! 十字光标导航.
//!
//! 保存连续坐标下的光标位置, 并派生出三个方向的切片索引. 本层不做边界检查:
//! 调用方需要在把索引交给切片提取之前自行截断 (见 [`CrosshairPosition::clamp_to`]).

use std::fmt;

use log::debug;

use crate::{Dimensions, Orientation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 连续的光标位置 (亚体素精度).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrosshairPosition {
    /// x 坐标, 决定矢状位索引.
    pub x: f64,
    /// y 坐标, 决定冠状位索引.
    pub y: f64,
    /// z 坐标, 决定轴位索引.
    pub z: f64,
}

impl CrosshairPosition {
    /// 直接构建.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 截断到 `dims` 内, 使派生的索引都是合法的切片索引.
    ///
    /// 每个轴按半开区间 `[0, len)` 处理: 区间内的坐标保持不变 (保留亚体素精度),
    /// `v >= len` 落到最后一层的起点 `len - 1`, 负数和 NaN 落到 0. 空维度被截断到 0.
    pub fn clamp_to(&self, dims: Dimensions) -> Self {
        #[inline]
        fn clamp_axis(v: f64, len: usize) -> f64 {
            if len == 0 || v.is_nan() || v <= 0.0 {
                0.0
            } else if v < len as f64 {
                v
            } else {
                (len - 1) as f64
            }
        }
        Self {
            x: clamp_axis(self.x, dims.x),
            y: clamp_axis(self.y, dims.y),
            z: clamp_axis(self.z, dims.z),
        }
    }
}

/// 由光标位置派生的三个切片索引. 可以为负, 也可以越界.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceIndices {
    /// `floor(z)`.
    pub axial: i64,
    /// `floor(y)`.
    pub coronal: i64,
    /// `floor(x)`.
    pub sagittal: i64,
}

impl SliceIndices {
    /// 三个索引总是一起计算.
    pub fn from_position(pos: &CrosshairPosition) -> Self {
        Self {
            axial: pos.z.floor() as i64,
            coronal: pos.y.floor() as i64,
            sagittal: pos.x.floor() as i64,
        }
    }

    /// 给定方向上的索引.
    #[inline]
    pub const fn get(&self, orientation: Orientation) -> i64 {
        match orientation {
            Orientation::Axial => self.axial,
            Orientation::Coronal => self.coronal,
            Orientation::Sagittal => self.sagittal,
        }
    }
}

type Listener = Box<dyn FnMut(SliceIndices) + Send>;

/// 光标导航器.
///
/// 每次 [`update_position`](Self::update_position) 之后, 按注册顺序通知所有监听者.
/// 关闭导航后, 位置和索引仍然照常更新, 只是不再通知.
pub struct CrosshairNavigator {
    position: CrosshairPosition,
    indices: SliceIndices,
    enabled: bool,
    listeners: Vec<Listener>,
}

impl Default for CrosshairNavigator {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CrosshairNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrosshairNavigator")
            .field("position", &self.position)
            .field("indices", &self.indices)
            .field("enabled", &self.enabled)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CrosshairNavigator {
    /// 光标位于原点, 导航开启, 无监听者.
    pub fn new() -> Self {
        Self {
            position: CrosshairPosition::default(),
            indices: SliceIndices::default(),
            enabled: true,
            listeners: Vec::new(),
        }
    }

    /// 当前位置.
    #[inline]
    pub fn position(&self) -> CrosshairPosition {
        self.position
    }

    /// 当前切片索引.
    #[inline]
    pub fn indices(&self) -> SliceIndices {
        self.indices
    }

    /// 是否开启导航通知.
    #[inline]
    pub fn is_navigation_enabled(&self) -> bool {
        self.enabled
    }

    /// 开启或关闭导航通知.
    #[inline]
    pub fn set_navigation_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// 注册监听者.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(SliceIndices) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// 移动光标, 重新计算索引并 (在导航开启时) 通知监听者. 返回新的索引.
    pub fn update_position(&mut self, x: f64, y: f64, z: f64) -> SliceIndices {
        self.position = CrosshairPosition::new(x, y, z);
        self.indices = SliceIndices::from_position(&self.position);
        debug!("crosshair -> ({x}, {y}, {z}), {:?}", self.indices);

        if self.enabled {
            let indices = self.indices;
            self.listeners.iter_mut().for_each(|l| l(indices));
        }
        self.indices
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{CrosshairNavigator, CrosshairPosition, SliceIndices};
    use crate::{Dimensions, Orientation};

    #[test]
    fn test_floor_indices() {
        let mut nav = CrosshairNavigator::new();
        let idx = nav.update_position(3.7, 1.2, 5.99);
        assert_eq!(
            idx,
            SliceIndices {
                axial: 5,
                coronal: 1,
                sagittal: 3
            }
        );
        assert_eq!(nav.position(), CrosshairPosition::new(3.7, 1.2, 5.99));

        let idx = nav.update_position(-0.5, 0.0, -2.0);
        assert_eq!((idx.sagittal, idx.coronal, idx.axial), (-1, 0, -2));
        assert_eq!(idx.get(Orientation::Sagittal), -1);
        assert_eq!(idx.get(Orientation::Axial), -2);
    }

    #[test]
    fn test_listeners_notified() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut nav = CrosshairNavigator::new();
        let sink = Arc::clone(&seen);
        nav.subscribe(move |idx| sink.lock().unwrap().push(idx));
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        nav.subscribe(move |_| *counter.lock().unwrap() += 1);

        nav.update_position(1.0, 2.0, 3.0);
        nav.update_position(4.5, 4.5, 4.5);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].axial, 3);
        assert_eq!(seen[1].sagittal, 4);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    /// 关闭导航: 索引仍更新, 但没有通知.
    #[test]
    fn test_disabled_navigation() {
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let mut nav = CrosshairNavigator::new();
        nav.subscribe(move |_| *counter.lock().unwrap() += 1);

        nav.set_navigation_enabled(false);
        assert!(!nav.is_navigation_enabled());
        let idx = nav.update_position(7.2, 6.1, 5.0);
        assert_eq!(nav.indices(), idx);
        assert_eq!(idx.axial, 5);
        assert_eq!(*count.lock().unwrap(), 0);

        nav.set_navigation_enabled(true);
        nav.update_position(0.0, 0.0, 0.0);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_clamp_to() {
        let dims = Dimensions::new(8, 4, 2);
        let p = CrosshairPosition::new(-3.0, 10.0, 1.5).clamp_to(dims);
        assert_eq!(p, CrosshairPosition::new(0.0, 3.0, 1.5));
        let idx = SliceIndices::from_position(&p);
        assert_eq!((idx.sagittal, idx.coronal, idx.axial), (0, 3, 1));

        // 恰好落在上界上: 归入最后一层.
        let p = CrosshairPosition::new(8.0, 3.999, 2.0).clamp_to(dims);
        assert_eq!(p, CrosshairPosition::new(7.0, 3.999, 1.0));
        let idx = SliceIndices::from_position(&p);
        assert_eq!((idx.sagittal, idx.coronal, idx.axial), (7, 3, 1));

        let p = CrosshairPosition::new(f64::NAN, 0.25, f64::INFINITY).clamp_to(dims);
        assert_eq!(p, CrosshairPosition::new(0.0, 0.25, 1.0));

        let empty = CrosshairPosition::new(5.0, 5.0, 5.0).clamp_to(Dimensions::new(0, 1, 0));
        assert_eq!(empty, CrosshairPosition::default());
    }
}
